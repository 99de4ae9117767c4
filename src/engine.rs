//! A registry of named rules that documents are fanned out to.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::{
    error::{CompileError, EngineError},
    function::{FunctionTable, NativeFn},
    rule::{AsyncEventHandler, EventHandler, Rule},
    select::compile_select,
    topic,
    value::Value,
};

/// Engine-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Pretty-print JSON produced by rules created through the engine
    pub pretty: bool,
}

impl EngineConfig {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// What a rule function factory learns about the rule it is built for.
///
/// The name of a SELECT rule is only known once the statement has been
/// compiled, which happens after its functions were created, so it is
/// filled in late.
#[derive(Debug, Clone, Default)]
pub struct RuleContext {
    name: Arc<OnceLock<String>>,
}

impl RuleContext {
    /// The rule's name, once known.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    fn set_name(&self, name: &str) {
        // a context belongs to exactly one rule, so this runs once
        let _ = self.name.set(name.to_string());
    }
}

/// Builds a function for one particular rule.
pub type RuleFunctionFactory = Arc<dyn Fn(&RuleContext) -> NativeFn + Send + Sync>;

/// Thread-safe rule registry.
///
/// # Examples
///
/// ```
/// use sql_rules::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default());
/// engine.parse_sql(r#"SELECT a AS x FROM "devices/+/status" WHERE a > 1"#).unwrap();
///
/// let out = engine.convert_json("devices/+/status", r#"{"a": 2}"#).unwrap();
/// assert_eq!(out, r#"{"x":2}"#);
/// ```
#[derive(Default)]
pub struct Engine {
    config: EngineConfig,
    rules: RwLock<HashMap<String, Arc<Rule>>>,
    functions: RwLock<HashMap<String, RuleFunctionFactory>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Register a per-rule function. Every rule compiled afterwards gets its
    /// own instance, created by `factory` with that rule's context.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sql_rules::{Engine, EngineConfig, Value};
    ///
    /// let engine = Engine::new(EngineConfig::default());
    /// engine.register_rule_function("clientid", |ctx| {
    ///     let ctx = ctx.clone();
    ///     Arc::new(move |_: &[Value]| ctx.name().map_or(Value::Null, Value::from))
    /// });
    /// engine.parse_sql("SELECT clientid() AS id FROM sensors").unwrap();
    ///
    /// assert_eq!(engine.convert_json("sensors", "{}").unwrap(), r#"{"id":"sensors"}"#);
    /// ```
    pub fn register_rule_function<F>(&self, name: &str, factory: F) -> &Self
    where
        F: Fn(&RuleContext) -> NativeFn + Send + Sync + 'static,
    {
        self.functions
            .write()
            .insert(name.to_lowercase(), Arc::new(factory));
        self
    }

    fn rule_functions(&self, context: &RuleContext) -> Option<Arc<FunctionTable>> {
        let factories = self.functions.read();
        if factories.is_empty() {
            return None;
        }
        let mut table = FunctionTable::new();
        for (name, factory) in factories.iter() {
            table.insert(name, factory(context));
        }
        Some(Arc::new(table))
    }

    /// Store `rule` under `name`, replacing any rule already there.
    pub fn put_rule(&self, name: &str, rule: Rule) -> Arc<Rule> {
        let rule = Arc::new(rule);
        log::debug!("registered rule {:?} ({} stage(s))", name, rule.stages().len());
        self.rules.write().insert(name.to_string(), Arc::clone(&rule));
        rule
    }

    pub fn remove_rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.rules.write().remove(name)
    }

    pub fn rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.rules.read().get(name).cloned()
    }

    /// Registered rule names, sorted.
    pub fn rule_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn new_rule(&self, name: &str) -> Rule {
        let context = RuleContext::default();
        context.set_name(name);
        Rule::new(name)
            .with_pretty(self.config.pretty)
            .with_functions(self.rule_functions(&context))
    }

    /// Compile `condition` into a one-stage rule that runs `handlers` on
    /// matching documents, and register it as `name`.
    pub fn parse_rule_event(
        &self,
        name: &str,
        condition: &str,
        handlers: Vec<EventHandler>,
    ) -> Result<Arc<Rule>, CompileError> {
        let mut rule = self.new_rule(name);
        rule.add_event_handlers(condition, handlers)?;
        Ok(self.put_rule(name, rule))
    }

    /// Like [`Engine::parse_rule_event`], with handlers run by
    /// [`Engine::handle_async`].
    pub fn parse_rule_async_event(
        &self,
        name: &str,
        condition: &str,
        handlers: Vec<AsyncEventHandler>,
    ) -> Result<Arc<Rule>, CompileError> {
        let mut rule = self.new_rule(name);
        rule.add_async_handlers(condition, handlers)?;
        Ok(self.put_rule(name, rule))
    }

    /// Compile a SELECT statement into a rule named after its `FROM` target.
    pub fn parse_sql(&self, sql: &str) -> Result<Arc<Rule>, CompileError> {
        let context = RuleContext::default();
        let functions = self.rule_functions(&context);
        let select = compile_select(sql, functions.clone())?;
        context.set_name(&select.name);

        let name = select.name.clone();
        let rule = Rule::from_select(select)
            .with_pretty(self.config.pretty)
            .with_functions(functions);
        Ok(self.put_rule(&name, rule))
    }

    /// Snapshot of the registered rules, so handlers never run under the lock.
    fn snapshot(&self) -> Vec<(String, Arc<Rule>)> {
        self.rules
            .read()
            .iter()
            .map(|(name, rule)| (name.clone(), Arc::clone(rule)))
            .collect()
    }

    /// Offer `document` to the async handlers of every rule.
    pub fn handle_async(&self, document: &Value) {
        for (_, rule) in self.snapshot() {
            rule.handle_async(document);
        }
    }

    /// Offer `document` to the rules whose name, read as a topic pattern,
    /// matches `topic`.
    pub fn handle_topic_async(&self, topic: &str, document: &Value) {
        for (name, rule) in self.snapshot() {
            if topic::matches(topic, &name) {
                rule.handle_async(document);
            }
        }
    }

    /// Decode `text` and pass it to [`Engine::handle_async`].
    pub fn handle_json_async(&self, text: &str) -> Result<(), EngineError> {
        let document = Value::from_json_str(text).map_err(|err| {
            log::warn!("dropping undecodable document: {}", err);
            err
        })?;
        self.handle_async(&document);
        Ok(())
    }

    /// Run the rule registered as `name` over a JSON document.
    pub fn convert_json(&self, name: &str, text: &str) -> Result<String, EngineError> {
        let rule = self
            .rule(name)
            .ok_or_else(|| EngineError::NoRuleFound(name.to_string()))?;
        rule.convert_json(text)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("rules", &self.rule_names())
            .finish_non_exhaustive()
    }
}
