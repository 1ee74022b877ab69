//! StoreEngine — owns the write connection, runs migrations at open,
//! exposes the typed catalog/read surface.

use std::path::Path;

use rusqlite::Connection;
use uuid::Uuid;

use vigil_core::errors::VigilResult;
use vigil_core::types::{CveRecord, Finding, FindingName, PluginSpec, PriorityResult, Product};

use crate::migrations;
use crate::pool::WriteConnection;
use crate::queries;

/// The storage engine. Reconciliation borrows the raw writer through
/// [`StoreEngine::with_writer`] to compose query functions inside one
/// transaction; everything else goes through the typed methods.
pub struct StoreEngine {
    writer: WriteConnection,
}

impl StoreEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> VigilResult<Self> {
        let writer = WriteConnection::open(path)?;
        let engine = Self { writer };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> VigilResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        let engine = Self { writer };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> VigilResult<()> {
        self.writer.with_conn_sync(migrations::run_migrations)
    }

    /// Execute a closure with exclusive access to the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> VigilResult<T>
    where
        F: FnOnce(&Connection) -> VigilResult<T>,
    {
        self.writer.with_conn_sync(f)
    }

    pub fn create_product(&self, product: &Product) -> VigilResult<()> {
        self.with_writer(|conn| queries::catalog_ops::insert_product(conn, product))
    }

    pub fn get_product(&self, id: Uuid) -> VigilResult<Option<Product>> {
        self.with_writer(|conn| queries::catalog_ops::get_product(conn, id))
    }

    pub fn list_products(&self) -> VigilResult<Vec<Product>> {
        self.with_writer(queries::catalog_ops::list_products)
    }

    pub fn create_plugin(&self, plugin: &PluginSpec) -> VigilResult<()> {
        self.with_writer(|conn| queries::catalog_ops::insert_plugin(conn, plugin))
    }

    pub fn get_plugin(&self, id: Uuid) -> VigilResult<Option<PluginSpec>> {
        self.with_writer(|conn| queries::catalog_ops::get_plugin(conn, id))
    }

    pub fn list_plugins(&self) -> VigilResult<Vec<PluginSpec>> {
        self.with_writer(queries::catalog_ops::list_plugins)
    }

    pub fn findings_for_product(&self, product_id: Uuid) -> VigilResult<Vec<Finding>> {
        self.with_writer(|conn| queries::finding_ops::list_for_product(conn, product_id))
    }

    pub fn finding_names_for_product(&self, product_id: Uuid) -> VigilResult<Vec<FindingName>> {
        self.with_writer(|conn| queries::finding_name_ops::list_for_product(conn, product_id))
    }

    /// Physical delete of a product's findings, optionally one host only.
    pub fn delete_findings(&self, product_id: Uuid, host: Option<&str>) -> VigilResult<usize> {
        let deleted = self
            .with_writer(|conn| queries::finding_ops::delete_findings(conn, product_id, host))?;
        tracing::info!(product_id = %product_id, deleted, "deleted findings");
        Ok(deleted)
    }

    /// CVE names still waiting for a priority.
    pub fn unscored_cves(&self) -> VigilResult<Vec<String>> {
        self.with_writer(queries::cve_ops::unscored_names)
    }

    pub fn cve_by_name(&self, name: &str) -> VigilResult<Option<CveRecord>> {
        self.with_writer(|conn| queries::cve_ops::get_by_name(conn, name))
    }

    /// Write one enrichment chunk back atomically.
    pub fn apply_priorities(&self, results: &[PriorityResult]) -> VigilResult<usize> {
        self.with_writer(|conn| queries::cve_ops::bulk_apply_priorities(conn, results))
    }
}
