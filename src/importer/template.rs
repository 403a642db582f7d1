// ==========================================
// Kitchen AI - Import Template Generator
// ==========================================
// Header row + one example row per entity, straight from the column
// contract. Output is CSV.
// ==========================================

use crate::domain::types::{EntityKind, RawRow};
use crate::importer::contract::ColumnContract;
use crate::importer::error::{ImportError, ImportResult};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub struct TemplateGenerator;

impl TemplateGenerator {
    /// Header row followed by the example row
    pub fn template_rows(&self, entity: EntityKind) -> Vec<Vec<String>> {
        let contract = ColumnContract::for_entity(entity);
        let headers = contract
            .columns
            .iter()
            .map(|c| c.source_header.clone())
            .collect();
        let example = contract.columns.iter().map(|c| c.example.clone()).collect();
        vec![headers, example]
    }

    /// Example row keyed by header, as the parser would return it
    pub fn example_row(&self, entity: EntityKind) -> RawRow {
        ColumnContract::for_entity(entity)
            .columns
            .iter()
            .map(|c| (c.source_header.clone(), c.example.clone()))
            .collect()
    }

    pub fn write_to<W: Write>(&self, entity: EntityKind, writer: W) -> ImportResult<()> {
        let mut csv_writer = WriterBuilder::new().from_writer(writer);
        for record in self.template_rows(entity) {
            csv_writer.write_record(&record)?;
        }
        csv_writer
            .flush()
            .map_err(|e| ImportError::FileReadError(e.to_string()))
    }

    pub fn write_file<P: AsRef<Path>>(&self, entity: EntityKind, out: P) -> ImportResult<()> {
        let path = out.as_ref();
        let file = File::create(path)?;
        self.write_to(entity, file)?;
        info!(entity = %entity, out = %path.display(), "template written");
        Ok(())
    }
}
