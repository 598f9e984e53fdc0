//! User-facing options and their resolution into a [`Config`].
//!
//! [`Options`] mirrors what a user writes (in JSON, or through the `with_*` builders) and may
//! leave any field unset. [`Options::resolve`] fills unset fields from the selected [`Preset`]
//! and produces a [`Config`] of plain flags and predicates that the raking passes consult.
//!
//! Meaningless comments are always removed; no option controls them.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{RakeError, classify::CommentCategory};

/// Decides whether a comment (raw text, delimiters included) is removed.
pub type CommentPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides whether a `console.<method>(...)` call is removed, given the method name and the
/// source text of the call.
pub type ConsolePredicate = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Every `console` method a filter with no explicit `include` list applies to.
pub const ALL_CONSOLE_METHODS: &[&str] = &[
    "assert",
    "clear",
    "context",
    "count",
    "countReset",
    "createTask",
    "debug",
    "dir",
    "dirxml",
    "error",
    "group",
    "groupCollapsed",
    "groupEnd",
    "info",
    "log",
    "profile",
    "profileEnd",
    "table",
    "time",
    "timeEnd",
    "timeLog",
    "timeStamp",
    "trace",
    "warn",
];

/// `console` methods the `application` preset leaves in place.
const APPLICATION_KEPT_CONSOLE_METHODS: &[&str] = &["info", "warn", "error", "debug"];

/// A named starting point that unset options fall back to.
///
/// With no preset, everything removable is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Keep license, documentation and annotation comments; remove all `console` calls and
    /// `debugger` statements.
    Library,
    /// Keep license comments and the `info`, `warn`, `error` and `debug` console methods;
    /// remove everything else.
    Application,
}

impl FromStr for Preset {
    type Err = RakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "library" => Ok(Self::Library),
            "application" => Ok(Self::Application),
            _ => Err(invalid("preset")),
        }
    }
}

/// Removal rule for licenses or docs.
#[derive(Clone)]
pub enum CommentRule {
    Remove(bool),
    Filter(CommentPredicate),
}

impl fmt::Debug for CommentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove(b) => f.debug_tuple("Remove").field(b).finish(),
            Self::Filter(_) => f.write_str("Filter(..)"),
        }
    }
}

/// Per-category comment settings. Unset fields fall back to the preset.
#[derive(Debug, Clone, Default)]
pub struct CommentSelection {
    pub licenses: Option<CommentRule>,
    pub docs: Option<CommentRule>,
    pub annotations: Option<bool>,
}

/// The `comments` option.
#[derive(Debug, Clone)]
pub enum CommentsOption {
    /// `true` removes every meaningful comment, `false` keeps them all.
    All(bool),
    Select(CommentSelection),
}

/// The `console` option.
#[derive(Clone)]
pub enum ConsoleOption {
    /// `true` removes every console call, `false` keeps them all.
    All(bool),
    Filter(ConsolePredicate),
    /// Remove the methods in `include` (default: [`ALL_CONSOLE_METHODS`]) that are not in
    /// `exclude` (default: empty).
    Methods {
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    },
}

impl fmt::Debug for ConsoleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(b) => f.debug_tuple("All").field(b).finish(),
            Self::Filter(_) => f.write_str("Filter(..)"),
            Self::Methods { include, exclude } => f
                .debug_struct("Methods")
                .field("include", include)
                .field("exclude", exclude)
                .finish(),
        }
    }
}

/// Raking options as supplied by a user.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub preset: Option<Preset>,
    pub comments: Option<CommentsOption>,
    pub console: Option<ConsoleOption>,
    pub debugger: Option<bool>,
}

impl Options {
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn with_comments(mut self, remove: bool) -> Self {
        self.comments = Some(CommentsOption::All(remove));
        self
    }

    pub fn with_licenses(mut self, remove: bool) -> Self {
        self.select(|s| s.licenses = Some(CommentRule::Remove(remove)));
        self
    }

    pub fn with_license_filter(
        mut self,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.select(|s| s.licenses = Some(CommentRule::Filter(Arc::new(filter))));
        self
    }

    pub fn with_docs(mut self, remove: bool) -> Self {
        self.select(|s| s.docs = Some(CommentRule::Remove(remove)));
        self
    }

    pub fn with_doc_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.select(|s| s.docs = Some(CommentRule::Filter(Arc::new(filter))));
        self
    }

    pub fn with_annotations(mut self, remove: bool) -> Self {
        self.select(|s| s.annotations = Some(remove));
        self
    }

    pub fn with_console(mut self, remove: bool) -> Self {
        self.console = Some(ConsoleOption::All(remove));
        self
    }

    pub fn with_console_filter(
        mut self,
        filter: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.console = Some(ConsoleOption::Filter(Arc::new(filter)));
        self
    }

    pub fn with_console_methods(
        mut self,
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    ) -> Self {
        self.console = Some(ConsoleOption::Methods { include, exclude });
        self
    }

    pub fn with_debugger(mut self, remove: bool) -> Self {
        self.debugger = Some(remove);
        self
    }

    /// Edit the per-category comment settings, replacing a blanket `comments: bool`.
    fn select(&mut self, edit: impl FnOnce(&mut CommentSelection)) {
        let mut selection = match self.comments.take() {
            Some(CommentsOption::Select(selection)) => selection,
            _ => CommentSelection::default(),
        };
        edit(&mut selection);
        self.comments = Some(CommentsOption::Select(selection));
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, RakeError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build options from a JSON value.
    ///
    /// Absent fields stay unset. A field of the wrong shape fails with
    /// [`RakeError::InvalidOption`] naming it (`"comments.docs"`, `"console.include"`, ...).
    /// Unknown fields are ignored.
    pub fn from_value(value: &Value) -> Result<Self, RakeError> {
        let Value::Object(map) = value else {
            return Err(invalid("options"));
        };

        let preset = match map.get("preset") {
            None => None,
            Some(v) => Some(Preset::deserialize(v).map_err(|_| invalid("preset"))?),
        };

        let comments = match map.get("comments") {
            None => None,
            Some(Value::Bool(b)) => Some(CommentsOption::All(*b)),
            Some(Value::Object(c)) => Some(CommentsOption::Select(CommentSelection {
                licenses: comment_rule(c.get("licenses"), "comments.licenses")?,
                docs: comment_rule(c.get("docs"), "comments.docs")?,
                annotations: flag(c.get("annotations"), "comments.annotations")?,
            })),
            Some(_) => return Err(invalid("comments")),
        };

        let console = match map.get("console") {
            None => None,
            Some(Value::Bool(b)) => Some(ConsoleOption::All(*b)),
            Some(Value::Object(c)) => Some(ConsoleOption::Methods {
                include: method_list(c.get("include"), "console.include")?,
                exclude: method_list(c.get("exclude"), "console.exclude")?,
            }),
            Some(_) => return Err(invalid("console")),
        };

        Ok(Self {
            preset,
            comments,
            console,
            debugger: flag(map.get("debugger"), "debugger")?,
        })
    }

    /// Fill unset fields from the preset.
    pub fn resolve(&self) -> Config {
        let preset = Config::for_preset(self.preset);
        let all = Config::all();
        let none = Config::none();

        let (licenses, docs, annotations) = match &self.comments {
            None => (
                preset.licenses.clone(),
                preset.docs.clone(),
                preset.annotations,
            ),
            Some(CommentsOption::All(remove)) => {
                let base = if *remove { &all } else { &none };
                (base.licenses.clone(), base.docs.clone(), base.annotations)
            }
            Some(CommentsOption::Select(selection)) => (
                resolve_rule(&selection.licenses, &preset.licenses),
                resolve_rule(&selection.docs, &preset.docs),
                selection.annotations.unwrap_or(preset.annotations),
            ),
        };

        let console = match &self.console {
            None => preset.console.clone(),
            Some(ConsoleOption::All(true)) => all.console.clone(),
            Some(ConsoleOption::All(false)) => None,
            Some(ConsoleOption::Filter(filter)) => Some(filter.clone()),
            Some(ConsoleOption::Methods { include, exclude }) => Some(create_filter(
                include
                    .clone()
                    .unwrap_or_else(|| ALL_CONSOLE_METHODS.iter().map(|m| m.to_string()).collect()),
                exclude.clone().unwrap_or_default(),
            )),
        };

        Config {
            licenses,
            docs,
            annotations,
            console,
            debugger: self.debugger.unwrap_or(preset.debugger),
        }
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Resolved raking configuration.
///
/// `None` predicates keep everything in their category.
#[derive(Clone, Default)]
pub struct Config {
    pub licenses: Option<CommentPredicate>,
    pub docs: Option<CommentPredicate>,
    pub annotations: bool,
    pub console: Option<ConsolePredicate>,
    pub debugger: bool,
}

impl Config {
    /// Remove everything removable. This is what no preset means.
    pub fn all() -> Self {
        let remove: CommentPredicate = Arc::new(|_: &str| true);
        Self {
            licenses: Some(remove.clone()),
            docs: Some(remove),
            annotations: true,
            console: Some(Arc::new(|_: &str, _: &str| true)),
            debugger: true,
        }
    }

    /// Keep everything except meaningless comments.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_preset(preset: Option<Preset>) -> Self {
        match preset {
            None => Self::all(),
            Some(Preset::Library) => Self {
                console: Some(Arc::new(|_: &str, _: &str| true)),
                debugger: true,
                ..Self::none()
            },
            Some(Preset::Application) => Self {
                docs: Some(Arc::new(|_: &str| true)),
                annotations: true,
                console: Some(create_filter(
                    ALL_CONSOLE_METHODS.iter().map(|m| m.to_string()).collect(),
                    APPLICATION_KEPT_CONSOLE_METHODS
                        .iter()
                        .map(|m| m.to_string())
                        .collect(),
                )),
                debugger: true,
                ..Self::none()
            },
        }
    }

    /// Whether the module pass has anything to remove.
    pub fn removes_nodes(&self) -> bool {
        self.debugger || self.console.is_some()
    }

    /// The comment-pass decision for a comment of the given category.
    pub fn remove_comment(&self, category: CommentCategory, raw: &str) -> bool {
        match category {
            CommentCategory::License => self.licenses.as_ref().is_some_and(|f| f(raw)),
            CommentCategory::Documentation => self.docs.as_ref().is_some_and(|f| f(raw)),
            CommentCategory::Annotation => self.annotations,
            CommentCategory::Meaningless => true,
        }
    }

    /// Whether `console.<method>(...)`, whose source text is `statement`, is removed.
    pub fn remove_console(&self, method: &str, statement: &str) -> bool {
        self.console.as_ref().is_some_and(|f| f(method, statement))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("licenses", &self.licenses.is_some())
            .field("docs", &self.docs.is_some())
            .field("annotations", &self.annotations)
            .field("console", &self.console.is_some())
            .field("debugger", &self.debugger)
            .finish()
    }
}

/// A console filter removing the methods in `include` that are not in `exclude`.
pub fn create_filter(include: Vec<String>, exclude: Vec<String>) -> ConsolePredicate {
    Arc::new(move |method: &str, _: &str| {
        include.iter().any(|m| m == method) && !exclude.iter().any(|m| m == method)
    })
}

fn resolve_rule(
    rule: &Option<CommentRule>,
    fallback: &Option<CommentPredicate>,
) -> Option<CommentPredicate> {
    match rule {
        None => fallback.clone(),
        Some(CommentRule::Remove(true)) => Some(Arc::new(|_: &str| true)),
        Some(CommentRule::Remove(false)) => None,
        Some(CommentRule::Filter(filter)) => Some(filter.clone()),
    }
}

fn comment_rule(value: Option<&Value>, name: &str) -> Result<Option<CommentRule>, RakeError> {
    match value {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(CommentRule::Remove(*b))),
        Some(_) => Err(invalid(name)),
    }
}

fn flag(value: Option<&Value>, name: &str) -> Result<Option<bool>, RakeError> {
    match value {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(name)),
    }
}

fn method_list(value: Option<&Value>, name: &str) -> Result<Option<Vec<String>>, RakeError> {
    match value {
        None => Ok(None),
        Some(v) => Vec::<String>::deserialize(v)
            .map(Some)
            .map_err(|_| invalid(name)),
    }
}

fn invalid(name: &str) -> RakeError {
    RakeError::InvalidOption {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_error(json: &str) -> String {
        match Options::from_json(json) {
            Err(RakeError::InvalidOption { name }) => name,
            other => panic!("expected an option error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_values_of_the_wrong_shape() {
        assert_eq!(option_error(r#"{"preset": true}"#), "preset");
        assert_eq!(option_error(r#"{"preset": "oops"}"#), "preset");
        assert_eq!(option_error(r#"{"comments": 1}"#), "comments");
        assert_eq!(
            option_error(r#"{"comments": {"licenses": 1}}"#),
            "comments.licenses"
        );
        assert_eq!(option_error(r#"{"comments": {"docs": 1}}"#), "comments.docs");
        assert_eq!(
            option_error(r#"{"comments": {"annotations": 1}}"#),
            "comments.annotations"
        );
        assert_eq!(option_error(r#"{"console": 1}"#), "console");
        assert_eq!(
            option_error(r#"{"console": {"include": 1}}"#),
            "console.include"
        );
        assert_eq!(
            option_error(r#"{"console": {"exclude": 1}}"#),
            "console.exclude"
        );
        assert_eq!(option_error(r#"{"debugger": 1}"#), "debugger");
        assert_eq!(option_error("[]"), "options");
    }

    #[test]
    fn error_message_names_the_option() {
        let err = Options::from_json(r#"{"debugger": "yes"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for \"debugger\" option.");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            Options::from_json("{"),
            Err(RakeError::Json(_))
        ));
    }

    #[test]
    fn parses_presets_by_name() {
        let options = Options::from_json(r#"{"preset": "application"}"#).unwrap();
        assert_eq!(options.preset, Some(Preset::Application));
        assert_eq!("library".parse::<Preset>().unwrap(), Preset::Library);
        assert!("all".parse::<Preset>().is_err());
    }

    #[test]
    fn deserializes_through_serde() {
        let options: Options =
            serde_json::from_str(r#"{"console": {"exclude": ["warn"]}, "debugger": false}"#)
                .unwrap();
        let config = options.resolve();
        assert!(!config.debugger);
        assert!(config.remove_console("log", "console.log()"));
        assert!(!config.remove_console("warn", "console.warn()"));

        assert!(serde_json::from_str::<Options>(r#"{"debugger": 0}"#).is_err());
    }

    #[test]
    fn default_removes_everything() {
        let config = Options::default().resolve();
        assert!(config.remove_comment(CommentCategory::License, "/*! x */"));
        assert!(config.remove_comment(CommentCategory::Documentation, "/** x */"));
        assert!(config.remove_comment(CommentCategory::Annotation, "/*#__PURE__*/"));
        assert!(config.remove_console("info", "console.info()"));
        assert!(config.debugger);
        assert!(config.removes_nodes());
    }

    #[test]
    fn library_preset_keeps_meaningful_comments() {
        let config = Options::default().with_preset(Preset::Library).resolve();
        assert!(!config.remove_comment(CommentCategory::License, "/*! x */"));
        assert!(!config.remove_comment(CommentCategory::Documentation, "/** x */"));
        assert!(!config.remove_comment(CommentCategory::Annotation, "/*#__PURE__*/"));
        assert!(config.remove_comment(CommentCategory::Meaningless, "// x"));
        assert!(config.remove_console("warn", "console.warn()"));
        assert!(config.debugger);
    }

    #[test]
    fn application_preset_keeps_licenses_and_logging_levels() {
        let config = Options::default().with_preset(Preset::Application).resolve();
        assert!(!config.remove_comment(CommentCategory::License, "/*! x */"));
        assert!(config.remove_comment(CommentCategory::Documentation, "/** x */"));
        assert!(config.remove_comment(CommentCategory::Annotation, "/*#__PURE__*/"));
        for kept in ["info", "warn", "error", "debug"] {
            assert!(!config.remove_console(kept, ""), "{kept} should be kept");
        }
        for removed in ["log", "dir", "group", "groupEnd", "timeStamp"] {
            assert!(config.remove_console(removed, ""), "{removed} should be removed");
        }
        assert!(!config.remove_console("notAMethod", ""));
    }

    #[test]
    fn comments_flag_overrides_the_preset() {
        let config = Options::default()
            .with_preset(Preset::Library)
            .with_comments(true)
            .resolve();
        assert!(config.remove_comment(CommentCategory::License, "/*! x */"));

        let config = Options::default().with_comments(false).resolve();
        assert!(!config.remove_comment(CommentCategory::Documentation, "/** x */"));
        assert!(!config.remove_comment(CommentCategory::Annotation, "/*@__PURE__*/"));
        assert!(config.remove_comment(CommentCategory::Meaningless, "/* x */"));
    }

    #[test]
    fn comment_selection_falls_back_per_field() {
        let config = Options::default()
            .with_preset(Preset::Application)
            .with_licenses(true)
            .resolve();
        assert!(config.remove_comment(CommentCategory::License, "/*! x */"));
        // Unset fields still come from the preset.
        assert!(config.remove_comment(CommentCategory::Documentation, "/** x */"));

        let config = Options::default()
            .with_doc_filter(|raw| raw.contains("@internal"))
            .with_annotations(false)
            .resolve();
        assert!(config.remove_comment(CommentCategory::Documentation, "/** @internal */"));
        assert!(!config.remove_comment(CommentCategory::Documentation, "/** @public */"));
        assert!(!config.remove_comment(CommentCategory::Annotation, "/*@__PURE__*/"));
        assert!(config.remove_comment(CommentCategory::License, "/*! x */"));
    }

    #[test]
    fn console_options() {
        let config = Options::default().with_console(false).resolve();
        assert!(config.console.is_none());
        assert!(config.removes_nodes());

        let config = Options::default()
            .with_console(false)
            .with_debugger(false)
            .resolve();
        assert!(!config.removes_nodes());

        let config = Options::default()
            .with_console_filter(|method, statement| method == "log" && statement.contains("DEV"))
            .resolve();
        assert!(config.remove_console("log", "console.log('DEV')"));
        assert!(!config.remove_console("log", "console.log('prod')"));

        let config = Options::default()
            .with_console_methods(Some(vec!["log".into(), "warn".into()]), Some(vec!["warn".into()]))
            .resolve();
        assert!(config.remove_console("log", ""));
        assert!(!config.remove_console("warn", ""));
        assert!(!config.remove_console("error", ""));

        let config = Options::default()
            .with_console_methods(Some(Vec::new()), None)
            .resolve();
        assert!(!config.remove_console("log", ""));
    }
}
