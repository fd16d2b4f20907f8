//! Drift engine
//!
//! Runs the middleware chain over both resource sets, then hands them to the
//! analyser. A middleware failure aborts the run before any comparison.

use crate::alerter::Alerts;
use crate::analyser::Analyzer;
use crate::analysis::Analysis;
use crate::error::Result;
use crate::filter::DriftIgnore;
use crate::middleware::Chain;
use crate::resource::Resource;
use crate::schema::SchemaRepository;

pub struct Engine {
    schemas: SchemaRepository,
    filter: DriftIgnore,
    chain: Chain,
}

impl Engine {
    /// Engine with the built-in middleware chain.
    pub fn new(schemas: SchemaRepository, filter: DriftIgnore) -> Self {
        Self {
            schemas,
            filter,
            chain: Chain::default_chain(),
        }
    }

    /// Replace the middleware chain.
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn schemas(&self) -> &SchemaRepository {
        &self.schemas
    }

    pub fn filter(&self) -> &DriftIgnore {
        &self.filter
    }

    /// Reconcile and compare `remote` against `state`.
    pub fn run(
        &self,
        mut remote: Vec<Resource>,
        mut state: Vec<Resource>,
        alerts: Alerts,
    ) -> Result<Analysis> {
        log::debug!(
            "Running {} middlewares over {} remote and {} state resources",
            self.chain.len(),
            remote.len(),
            state.len()
        );
        self.chain.execute(&mut remote, &mut state)?;
        log::debug!(
            "After middlewares: {} remote and {} state resources",
            remote.len(),
            state.len()
        );

        let analyzer = Analyzer::new(&self.schemas, &self.filter);
        Ok(analyzer.analyze(&remote, &state, &alerts))
    }
}
