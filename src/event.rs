//! Discovery events - Replays a parser's build calls from a JSON Lines file
//!
//! Each line is one construct the parser discovered, tagged by `event`:
//!
//! ```text
//! {"event":"file","path":"src/Parser.php"}
//! {"event":"class","name":"php::depend::Parser","line":12}
//! {"event":"method","name":"parse","line":20}
//! {"event":"implements","interface":"php::depend::Visitor"}
//! ```
//!
//! Member events without an explicit `owner` attach to the last declared
//! type of the current file.

use crate::builder::ModelBuilder;
use crate::node::{ClassOrInterfaceConstant, FunctionId, Parameter, SourceFileId, TypeId};
use crate::value::{MemberValue, ValueType};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

/// One construct reported by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    Package {
        name: String,
    },
    File {
        path: PathBuf,
    },
    Class {
        name: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        is_abstract: bool,
        #[serde(default)]
        doc_comment: Option<String>,
    },
    Interface {
        name: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        doc_comment: Option<String>,
    },
    Function {
        name: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        parameters: Vec<EventParameter>,
    },
    Method {
        name: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        is_abstract: bool,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        parameters: Vec<EventParameter>,
        #[serde(default)]
        return_type: Option<String>,
    },
    Property {
        name: String,
        #[serde(default)]
        line: u32,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        type_hint: Option<String>,
        #[serde(default, deserialize_with = "present")]
        default: Option<EventValue>,
    },
    Constant {
        name: String,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default, deserialize_with = "present")]
        value: Option<EventValue>,
    },
    Extends {
        parent: String,
        #[serde(default)]
        child: Option<String>,
    },
    Implements {
        interface: String,
        #[serde(default)]
        class: Option<String>,
    },
    Dependency {
        target: String,
        #[serde(default)]
        owner: Option<String>,
    },
}

impl DiscoveryEvent {
    /// Tag name as written in the event file
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryEvent::Package { .. } => "package",
            DiscoveryEvent::File { .. } => "file",
            DiscoveryEvent::Class { .. } => "class",
            DiscoveryEvent::Interface { .. } => "interface",
            DiscoveryEvent::Function { .. } => "function",
            DiscoveryEvent::Method { .. } => "method",
            DiscoveryEvent::Property { .. } => "property",
            DiscoveryEvent::Constant { .. } => "constant",
            DiscoveryEvent::Extends { .. } => "extends",
            DiscoveryEvent::Implements { .. } => "implements",
            DiscoveryEvent::Dependency { .. } => "dependency",
        }
    }
}

/// A parameter of a function or method event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParameter {
    pub name: String,
    #[serde(default)]
    pub type_hint: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<EventValue>,
}

/// A literal as it appears in an event.
///
/// Plain JSON literals map onto the matching value kind. The explicit form
/// `{"type": "integer", "raw": "0x1F"}` keeps the source text and accepts
/// every parser type alias. Numeric types require `raw`; string and constant
/// types may omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Typed {
        #[serde(rename = "type")]
        value_type: String,
        #[serde(default)]
        raw: Option<String>,
        #[serde(default)]
        negative: bool,
    },
    Literal(serde_json::Value),
}

/// A present `null` is a null literal, not a missing value
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<EventValue>, D::Error>
where
    D: Deserializer<'de>,
{
    EventValue::deserialize(deserializer).map(Some)
}

/// Parse discovery events from JSON Lines text.
///
/// Blank lines and lines starting with `#` are skipped. Line numbers in
/// errors are 1-based.
pub fn parse_events(text: &str) -> Result<Vec<DiscoveryEvent>> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_text = line.trim();
        if line_text.is_empty() || line_text.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line_text).map_err(|source| Error::Event {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read discovery events from a JSON Lines file
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<DiscoveryEvent>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let events = parse_events(&text)?;
    tracing::debug!("[EVENTS] read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Feeds discovery events into a [`ModelBuilder`].
#[derive(Debug)]
pub struct EventReplayer<'a> {
    builder: &'a mut ModelBuilder,
    current_file: Option<SourceFileId>,
    current_type: Option<TypeId>,
    replayed: usize,
}

impl<'a> EventReplayer<'a> {
    pub fn new(builder: &'a mut ModelBuilder) -> Self {
        Self {
            builder,
            current_file: None,
            current_type: None,
            replayed: 0,
        }
    }

    /// Type that owner-less member events attach to
    pub fn current_type(&self) -> Option<TypeId> {
        self.current_type
    }

    pub fn current_file(&self) -> Option<SourceFileId> {
        self.current_file
    }

    /// Number of events applied so far
    pub fn replayed(&self) -> usize {
        self.replayed
    }

    /// Replay every event in order, stopping at the first failure
    pub fn replay_all(&mut self, events: impl IntoIterator<Item = DiscoveryEvent>) -> Result<usize> {
        for event in events {
            self.replay(&event)?;
        }
        Ok(self.replayed)
    }

    pub fn replay(&mut self, event: &DiscoveryEvent) -> Result<()> {
        tracing::trace!("[EVENTS] replay {}", event.kind());
        match event {
            DiscoveryEvent::Package { name } => {
                self.builder.build_package(name);
            }
            DiscoveryEvent::File { path } => {
                self.current_file = Some(self.builder.build_source_file(path));
                self.current_type = None;
            }
            DiscoveryEvent::Class {
                name,
                line,
                is_abstract,
                doc_comment,
            } => {
                let id = self.builder.build_class(name, *line);
                self.declare(id, doc_comment.as_deref());
                if let Some(node) = self.builder.type_node_mut(id) {
                    node.set_abstract(*is_abstract);
                }
            }
            DiscoveryEvent::Interface {
                name,
                line,
                doc_comment,
            } => {
                let id = self.builder.build_interface(name, *line);
                self.declare(id, doc_comment.as_deref());
            }
            DiscoveryEvent::Function {
                name,
                line,
                parameters,
            } => {
                let id = self.builder.build_function(name, *line);
                if let Some(file) = self.current_file {
                    self.builder.set_function_source_file(id, file);
                }
                self.add_function_parameters(id, parameters)?;
            }
            DiscoveryEvent::Method {
                name,
                line,
                owner,
                is_abstract,
                is_static,
                parameters,
                return_type,
            } => {
                let owner = self.owner(owner.as_deref(), "method", name)?;
                let mut method = self.builder.build_method(name, *line);
                method.is_abstract = *is_abstract;
                method.is_static = *is_static;
                method.return_type = return_type
                    .as_deref()
                    .map(|hint| self.builder.build_class_or_interface_proxy(hint));
                for (position, parameter) in parameters.iter().enumerate() {
                    method
                        .parameters
                        .push(self.parameter(parameter, *line, position)?);
                }
                let hints: Vec<String> = parameters
                    .iter()
                    .filter_map(|p| p.type_hint.clone())
                    .chain(return_type.clone())
                    .collect();
                for hint in &hints {
                    self.builder.add_type_dependency(owner, hint);
                }
                if let Some(node) = self.builder.type_node_mut(owner) {
                    node.add_method(method);
                }
            }
            DiscoveryEvent::Property {
                name,
                line,
                owner,
                is_static,
                type_hint,
                default,
            } => {
                let owner = self.owner(owner.as_deref(), "property", name)?;
                let mut property = self.builder.build_property(name, *line);
                property.is_static = *is_static;
                if let Some(hint) = type_hint {
                    property.type_hint = self.builder.add_type_dependency(owner, hint);
                }
                property.default_value = default
                    .as_ref()
                    .map(|value| self.value(value))
                    .transpose()?;
                if let Some(node) = self.builder.type_node_mut(owner) {
                    node.add_property(property);
                }
            }
            DiscoveryEvent::Constant { name, owner, value } => {
                let owner = self.owner(owner.as_deref(), "constant", name)?;
                let mut constant: ClassOrInterfaceConstant =
                    self.builder.build_class_or_interface_constant(name);
                constant.value = value.as_ref().map(|v| self.value(v)).transpose()?;
                if let Some(node) = self.builder.type_node_mut(owner) {
                    node.add_constant(constant);
                }
            }
            DiscoveryEvent::Extends { parent, child } => {
                let child = self.owner(child.as_deref(), "extends", parent)?;
                let child_is_interface = self
                    .builder
                    .type_node(child)
                    .is_some_and(|node| node.is_interface());
                let parent_id = if child_is_interface {
                    self.builder.build_interface(parent, 0)
                } else {
                    self.builder.build_class(parent, 0)
                };
                self.link(parent_id, child, parent);
            }
            DiscoveryEvent::Implements { interface, class } => {
                let class = self.owner(class.as_deref(), "implements", interface)?;
                let interface_id = self.builder.build_interface(interface, 0);
                self.link(interface_id, class, interface);
            }
            DiscoveryEvent::Dependency { target, owner } => {
                let owner = self.owner(owner.as_deref(), "dependency", target)?;
                self.builder.add_type_dependency(owner, target);
            }
        }
        self.replayed += 1;
        Ok(())
    }

    fn declare(&mut self, id: TypeId, doc_comment: Option<&str>) {
        if let Some(file) = self.current_file {
            self.builder.set_type_source_file(id, file);
        }
        if let (Some(doc), Some(node)) = (doc_comment, self.builder.type_node_mut(id)) {
            node.set_doc_comment(doc);
        }
        self.current_type = Some(id);
    }

    fn link(&mut self, parent: TypeId, child: TypeId, parent_name: &str) {
        self.builder.add_type_dependency(child, parent_name);
        self.builder.add_child_type(parent, child);
    }

    /// Resolve the owner of a member event
    fn owner(&mut self, named: Option<&str>, event: &str, member: &str) -> Result<TypeId> {
        match named {
            Some(name) => Ok(self.builder.build_proxy_subject(name)),
            None => self.current_type.ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "{event} '{member}' has no owner and no type was declared before it"
                ))
            }),
        }
    }

    fn add_function_parameters(&mut self, id: FunctionId, parameters: &[EventParameter]) -> Result<()> {
        let line = self.builder.function(id).map(|f| f.line()).unwrap_or_default();
        for (position, spec) in parameters.iter().enumerate() {
            let parameter = self.parameter(spec, line, position)?;
            let hint = parameter.type_hint;
            if let Some(function) = self.builder.function_mut(id) {
                if let Some(proxy) = hint {
                    function.add_dependency(proxy);
                }
                function.add_parameter(parameter);
            }
        }
        Ok(())
    }

    fn parameter(&mut self, spec: &EventParameter, line: u32, position: usize) -> Result<Parameter> {
        let mut parameter = self.builder.build_parameter(&spec.name, line);
        parameter.position = position;
        parameter.type_hint = spec
            .type_hint
            .as_deref()
            .map(|hint| self.builder.build_class_or_interface_proxy(hint));
        parameter.default_value = spec.default.as_ref().map(|v| self.value(v)).transpose()?;
        Ok(parameter)
    }

    fn value(&self, value: &EventValue) -> Result<Rc<MemberValue>> {
        match value {
            EventValue::Typed {
                value_type,
                raw,
                negative,
            } => {
                let value_type = ValueType::from_str(value_type)?;
                if !value_type.is_numeric() {
                    return Ok(self.builder.build_scalar_value(value_type, raw.as_deref()));
                }
                let raw = raw.as_deref().ok_or_else(|| {
                    Error::InvalidArgument(format!("{value_type} literal without raw text"))
                })?;
                Ok(self.builder.build_numeric_value(value_type, raw, *negative))
            }
            EventValue::Literal(literal) => self.literal(literal),
        }
    }

    fn literal(&self, literal: &serde_json::Value) -> Result<Rc<MemberValue>> {
        use serde_json::Value;

        match literal {
            Value::Null => Ok(self.builder.build_null_value()),
            Value::Bool(true) => Ok(self.builder.build_true_value()),
            Value::Bool(false) => Ok(self.builder.build_false_value()),
            Value::Number(number) => {
                let text = number.to_string();
                let negative = text.starts_with('-');
                let raw = text.trim_start_matches('-');
                let value_type = if number.is_f64() {
                    ValueType::Float
                } else {
                    ValueType::Integer
                };
                Ok(self.builder.build_numeric_value(value_type, raw, negative))
            }
            Value::String(text) => Ok(self.builder.build_scalar_value(ValueType::String, Some(text.as_str()))),
            Value::Array(_) | Value::Object(_) => Err(Error::InvalidArgument(format!(
                "unsupported literal value: {literal}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
# parser output for two files
{"event":"file","path":"src/Parser.php"}
{"event":"class","name":"app::Parser","line":3,"doc_comment":"/** Parser */"}
{"event":"extends","parent":"Base"}
{"event":"implements","interface":"app::Visitor"}
{"event":"method","name":"parse","line":10,"parameters":[{"name":"$input","type_hint":"app::Input"}],"return_type":"app::Node"}
{"event":"property","name":"$depth","line":5,"default":0}
{"event":"constant","name":"MAX","value":{"type":"lnumber","raw":"0x1F"}}

{"event":"file","path":"src/Visitor.php"}
{"event":"interface","name":"app::Visitor","line":2}
{"event":"function","name":"app_main","line":40,"parameters":[{"name":"$argv","default":null}]}
"#;

    fn replay(text: &str) -> ModelBuilder {
        let mut builder = ModelBuilder::new();
        let events = parse_events(text).unwrap();
        EventReplayer::new(&mut builder).replay_all(events).unwrap();
        builder
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let events = parse_events(SAMPLE).unwrap();
        assert_eq!(events.len(), 10);
        assert_eq!(events[0].kind(), "file");
        assert_eq!(
            events[1],
            DiscoveryEvent::Class {
                name: "app::Parser".to_string(),
                line: 3,
                is_abstract: false,
                doc_comment: Some("/** Parser */".to_string()),
            }
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let text = "{\"event\":\"package\",\"name\":\"a\"}\n\n{\"event\":\"class\"}\n";
        match parse_events(text) {
            Err(Error::Event { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected event error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_tag_is_rejected() {
        let err = parse_events(r#"{"event":"trait","name":"T"}"#).unwrap_err();
        assert!(matches!(err, Error::Event { line: 1, .. }));
    }

    #[test]
    fn test_read_events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let events = read_events(file.path()).unwrap();
        assert_eq!(events.len(), 10);
    }

    #[test]
    fn test_read_events_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_events(dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_replay_builds_model() {
        let mut builder = replay(SAMPLE);

        let parser = builder.find_type("app::Parser").unwrap();
        let node = builder.type_node(parser).unwrap();
        assert_eq!(node.methods().len(), 1);
        assert_eq!(node.methods()[0].parameters[0].name, "$input");
        assert_eq!(node.properties().len(), 1);
        assert_eq!(node.constants()[0].name, "MAX");
        assert_eq!(node.doc_comment(), Some("/** Parser */"));
        let file = builder.source_file(node.source_file()).unwrap();
        assert_eq!(file.path(), Some(Path::new("src/Parser.php")));

        // the implements event created the interface before its declaration
        let visitor = builder.find_type("app::Visitor").unwrap();
        let visitor_node = builder.type_node(visitor).unwrap();
        assert!(visitor_node.is_interface());
        assert_eq!(visitor_node.child_types(), &[parser]);

        let names: Vec<String> = builder
            .packages()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["+global", "app"]);
    }

    #[test]
    fn test_replay_values() {
        let builder = replay(SAMPLE);
        let parser = builder.find_type("app::Parser").unwrap();
        let node = builder.type_node(parser).unwrap();

        let depth = node.properties()[0].default_value.as_deref().unwrap();
        assert_eq!(depth.display_text(), "0");

        match node.constants()[0].value.as_deref() {
            Some(MemberValue::Numeric(n)) => {
                assert_eq!(n.value_type, ValueType::Integer);
                assert_eq!(n.value(), Some(31.0));
            }
            other => panic!("expected numeric constant, got {other:?}"),
        }

        let main = builder
            .default_package()
            .functions()
            .next()
            .and_then(|id| builder.function(id))
            .unwrap();
        let argv = main.parameters()[0].default_value.clone().unwrap();
        assert!(Rc::ptr_eq(&argv, &builder.build_null_value()));
    }

    #[test]
    fn test_extends_guesses_parent_in_default_package() {
        let builder = replay(SAMPLE);
        // `Base` was only referenced, so it lives in the default package
        let base = builder.find_type("Base").unwrap();
        assert!(builder.default_package().contains_type(base));
        assert_eq!(builder.type_node(base).unwrap().line(), 0);
    }

    #[test]
    fn test_explicit_owner() {
        let builder = replay(
            r#"{"event":"method","name":"run","line":4,"owner":"app::Job"}
{"event":"dependency","target":"app::Queue","owner":"app::Job"}"#,
        );
        let job = builder.find_type("app::Job").unwrap();
        let node = builder.type_node(job).unwrap();
        assert!(node.is_class());
        assert_eq!(node.methods()[0].name, "run");
        assert_eq!(node.dependencies().len(), 1);
    }

    #[test]
    fn test_member_without_owner_fails() {
        let mut builder = ModelBuilder::new();
        let event = DiscoveryEvent::Property {
            name: "$x".to_string(),
            line: 1,
            owner: None,
            is_static: false,
            type_hint: None,
            default: None,
        };
        let err = EventReplayer::new(&mut builder).replay(&event).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_file_event_resets_current_type() {
        let mut builder = ModelBuilder::new();
        let mut replayer = EventReplayer::new(&mut builder);
        let events = parse_events(
            r#"{"event":"class","name":"A","line":1}
{"event":"file","path":"b.php"}"#,
        )
        .unwrap();
        replayer.replay_all(events).unwrap();
        assert!(replayer.current_type().is_none());
        assert!(replayer.current_file().is_some());
        assert_eq!(replayer.replayed(), 2);
    }

    #[test]
    fn test_unknown_value_type() {
        let err = parse_events(
            r#"{"event":"class","name":"A"}
{"event":"constant","name":"X","value":{"type":"complex","raw":"1i"}}"#,
        )
        .and_then(|events| {
            let mut builder = ModelBuilder::new();
            EventReplayer::new(&mut builder).replay_all(events)
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnknownValueType(t) if t == "complex"));
    }

    #[test]
    fn test_interface_replaces_guessed_parent() {
        let mut builder = replay(
            r#"{"event":"class","name":"Child","line":1}
{"event":"extends","parent":"Shape"}
{"event":"method","name":"area","line":3,"owner":"Shape"}
{"event":"interface","name":"Shape","line":9}"#,
        );
        let child = builder.find_type("Child").unwrap();
        let shape = builder.find_type("Shape").unwrap();
        let node = builder.type_node(shape).unwrap();
        assert!(node.is_interface());
        assert_eq!(node.child_types(), &[child]);
        assert_eq!(node.methods().len(), 1);
        assert_eq!(node.methods()[0].name, "area");
        assert_eq!(builder.stats().detached, 1);

        let snapshot = crate::ModelSnapshot::collect(&mut builder);
        let shape = snapshot.packages[0]
            .types
            .iter()
            .find(|t| t.name == "Shape")
            .unwrap();
        assert_eq!(shape.children, vec!["+global::Child"]);
        assert_eq!(shape.methods, vec!["area"]);
    }

    #[test]
    fn test_numeric_value_requires_raw_text() {
        let err = parse_events(
            r#"{"event":"class","name":"A"}
{"event":"constant","name":"X","value":{"type":"integer"}}"#,
        )
        .and_then(|events| {
            let mut builder = ModelBuilder::new();
            EventReplayer::new(&mut builder).replay_all(events)
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let builder = replay(
            r#"{"event":"class","name":"A"}
{"event":"constant","name":"Y","value":{"type":"const"}}"#,
        );
        let a = builder.find_type("A").unwrap();
        match builder.type_node(a).unwrap().constants()[0].value.as_deref() {
            Some(MemberValue::Scalar(scalar)) => assert!(scalar.raw.is_none()),
            other => panic!("expected scalar constant, got {other:?}"),
        }
    }
}
