//! Named pipelines of filter and mapper stages.

use std::fmt;
use std::sync::Arc;

use crate::{
    error::{CompileError, EngineError},
    filter::Filter,
    function::FunctionTable,
    mapper::Mapper,
    select::Select,
    value::Value,
};

/// Runs on every document a filter stage lets through; its result feeds the
/// next handler and then the next stage.
pub type EventHandler = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Receives a copy of every document a filter stage lets through, on the
/// rayon thread pool.
pub type AsyncEventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// One step of a [`Rule`].
#[derive(Clone)]
pub enum Stage {
    Filter {
        filter: Filter,
        handlers: Vec<EventHandler>,
        async_handlers: Vec<AsyncEventHandler>,
    },
    Mapper(Mapper),
}

impl Stage {
    /// A filter stage without handlers: it only decides whether the document
    /// goes on.
    pub fn filter(filter: Filter) -> Self {
        Stage::Filter {
            filter,
            handlers: Vec::new(),
            async_handlers: Vec::new(),
        }
    }

    fn handle(&self, document: Value) -> Option<Value> {
        match self {
            Stage::Filter {
                filter, handlers, ..
            } => {
                if !filter.matches(&document) {
                    return None;
                }
                Some(handlers.iter().fold(document, |doc, handler| handler(doc)))
            }
            Stage::Mapper(mapper) => Some(mapper.apply(&document)),
        }
    }

    fn handle_async(&self, document: &Value) {
        let Stage::Filter {
            filter,
            async_handlers,
            ..
        } = self
        else {
            return;
        };
        if async_handlers.is_empty() || !filter.matches(document) {
            return;
        }
        for handler in async_handlers {
            let handler = Arc::clone(handler);
            let document = document.clone();
            rayon::spawn(move || handler(document));
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Filter {
                filter,
                handlers,
                async_handlers,
            } => f
                .debug_struct("Filter")
                .field("filter", filter)
                .field("handlers", &handlers.len())
                .field("async_handlers", &async_handlers.len())
                .finish(),
            Stage::Mapper(mapper) => f.debug_tuple("Mapper").field(mapper).finish(),
        }
    }
}

/// A named pipeline. A document passes through the stages in order and is
/// dropped by the first filter that rejects it.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    name: String,
    pretty: bool,
    functions: Option<Arc<FunctionTable>>,
    stages: Vec<Stage>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Rule {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a rule from a compiled SELECT: its WHERE filter (if any), then
    /// its mapper.
    pub fn from_select(select: Select) -> Self {
        let mut rule = Rule::new(select.name);
        if let Some(filter) = select.filter {
            rule.add_stage(Stage::filter(filter));
        }
        rule.add_stage(Stage::Mapper(select.mapper));
        rule
    }

    /// Pretty-print JSON produced by [`Rule::convert_json`].
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Override functions used by filters added through this rule.
    pub fn with_functions(mut self, functions: Option<Arc<FunctionTable>>) -> Self {
        self.functions = functions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn add_stage(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Insert before `index`; an out-of-range index appends.
    pub fn insert_stage(&mut self, index: usize, stage: Stage) -> &mut Self {
        if index < self.stages.len() {
            self.stages.insert(index, stage);
        } else {
            self.stages.push(stage);
        }
        self
    }

    /// Append a filter stage that runs `handlers` on matching documents.
    pub fn add_event_handlers(
        &mut self,
        condition: &str,
        handlers: Vec<EventHandler>,
    ) -> Result<&mut Self, CompileError> {
        let filter = Filter::compile(condition, self.functions.clone())?;
        Ok(self.add_stage(Stage::Filter {
            filter,
            handlers,
            async_handlers: Vec::new(),
        }))
    }

    /// Append a filter stage whose matching documents are handed to
    /// `handlers` by [`Rule::handle_async`].
    pub fn add_async_handlers(
        &mut self,
        condition: &str,
        handlers: Vec<AsyncEventHandler>,
    ) -> Result<&mut Self, CompileError> {
        let filter = Filter::compile(condition, self.functions.clone())?;
        Ok(self.add_stage(Stage::Filter {
            filter,
            handlers: Vec::new(),
            async_handlers: handlers,
        }))
    }

    /// Run the pipeline. `None` means some filter rejected the document.
    pub fn handle(&self, document: Value) -> Option<Value> {
        self.stages
            .iter()
            .try_fold(document, |doc, stage| stage.handle(doc))
    }

    /// Offer `document` to every filter stage with async handlers. Stages
    /// are checked independently of each other; handlers run on the rayon
    /// pool and this returns immediately.
    pub fn handle_async(&self, document: &Value) {
        for stage in &self.stages {
            stage.handle_async(document);
        }
    }

    /// Decode `text`, run the pipeline and encode the result. A rejected
    /// document encodes as `null`.
    pub fn convert_json(&self, text: &str) -> Result<String, EngineError> {
        let document = Value::from_json_str(text)?;
        let output = self.handle(document).unwrap_or_default();
        Ok(output.to_json_string(self.pretty)?)
    }
}
