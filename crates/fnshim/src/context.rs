use crate::db::{DbClient, NoopDb};
use crate::diagnostics::FunctionLogger;
use crate::kv::{KvStore, NoopStore};

/// Per-invocation collaborators handed to user code.
///
/// Built fresh for each invocation instead of living in process-wide
/// globals, so tests and reused instances stay isolated.
pub struct Context {
    store: Box<dyn KvStore>,
    db: Box<dyn DbClient>,
    logger: FunctionLogger,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(NoopStore)
    }
}

impl Context {
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            db: Box::new(NoopDb),
            logger: FunctionLogger::default(),
        }
    }

    pub fn with_db(mut self, db: impl DbClient + 'static) -> Self {
        self.db = Box::new(db);
        self
    }

    /// Attach a logger that tags events with `function`.
    pub fn with_function_name(mut self, function: impl Into<String>) -> Self {
        self.logger = FunctionLogger::new(function);
        self
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    pub fn db(&self) -> &dyn DbClient {
        self.db.as_ref()
    }

    pub fn log(&self) -> &FunctionLogger {
        &self.logger
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}
