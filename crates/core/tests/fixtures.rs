use std::path::PathBuf;

use code_raker::{
    Config, Options, Preset,
    rake::{rake_all, render_chunk, transform},
};
use regex::Regex;

const LINE_COMMENTS: &str = r"\bline comment\b";
const BLOCK_COMMENTS: &str = r"\bblock comment\b";
const LICENSES: &str = r"@?license\b";
const DOCS: &str = r"\bdocumentation\b";
const ANNOTATIONS: &str = r"[@#]__(?:PURE|NO_SIDE_EFFECTS)__";
const DEBUGGER_STATEMENTS: &str = r"\bdebugger\b";
const CONSOLE_CALLS: &str = r"\bconsole.(\w+)";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).expect("read fixture")
}

fn count(pattern: &str, code: &str) -> usize {
    Regex::new(pattern).unwrap().find_iter(code).count()
}

/// The module pass followed by the chunk pass over its output, as a bundler runs them.
fn rake(source: &str, config: &Config) -> String {
    let code = match transform(source, "presets.js", config).unwrap() {
        Some(out) => out.code,
        None => source.to_string(),
    };
    match render_chunk(&code, "presets.js", config).unwrap() {
        Some(out) => out.code,
        None => code,
    }
}

fn rake_presets(options: Options) -> String {
    rake(&read_fixture("presets.js"), &options.resolve())
}

#[test]
fn fixture_has_expected_contents() {
    let source = read_fixture("presets.js");
    assert_eq!(count(LINE_COMMENTS, &source), 2);
    assert_eq!(count(BLOCK_COMMENTS, &source), 2);
    assert_eq!(count(LICENSES, &source), 2);
    assert_eq!(count(DOCS, &source), 2);
    assert_eq!(count(ANNOTATIONS, &source), 2);
    assert_eq!(count(DEBUGGER_STATEMENTS, &source), 1);
    assert_eq!(count(CONSOLE_CALLS, &source), 10);
}

#[test]
fn default_removes_everything() {
    let code = rake_presets(Options::default());
    assert_eq!(
        code,
        "\n\nconst someVar = \"something\";\n\nexport function foo(arg1, arg2) {\n}\n\n\
         function pure() {\n}\n\nfunction impure() {\n    setTimeout(() => {}, 1000);\n}\n\n\
         function now() {\n}\n\nconst x = pure();\nconst y = impure();\n\n"
    );
}

#[test]
fn raking_twice_changes_nothing() {
    let config = Options::default().resolve();
    let once = rake(&read_fixture("presets.js"), &config);
    assert_eq!(transform(&once, "presets.js", &config).unwrap(), None);
    assert_eq!(render_chunk(&once, "presets.js", &config).unwrap(), None);
}

#[test]
fn comments_false_keeps_meaningful_comments() {
    let code = rake_presets(Options::default().with_comments(false));
    assert_eq!(count(LINE_COMMENTS, &code), 0);
    assert_eq!(count(BLOCK_COMMENTS, &code), 0);
    assert_eq!(count(LICENSES, &code), 2);
    assert_eq!(count(DOCS, &code), 2);
    assert_eq!(count(ANNOTATIONS, &code), 2);
}

#[test]
fn licenses_false_keeps_only_licenses() {
    let code = rake_presets(Options::default().with_licenses(false));
    assert_eq!(count(LINE_COMMENTS, &code), 0);
    assert_eq!(count(BLOCK_COMMENTS, &code), 0);
    assert_eq!(count(LICENSES, &code), 2);
    assert_eq!(count(DOCS, &code), 0);
    assert_eq!(count(ANNOTATIONS, &code), 0);
}

#[test]
fn docs_false_keeps_only_docs() {
    let code = rake_presets(Options::default().with_docs(false));
    assert_eq!(count(LICENSES, &code), 0);
    assert_eq!(count(DOCS, &code), 2);
    assert_eq!(count(ANNOTATIONS, &code), 0);
}

#[test]
fn annotations_false_keeps_only_annotations() {
    let code = rake_presets(Options::default().with_annotations(false));
    assert_eq!(count(LICENSES, &code), 0);
    assert_eq!(count(DOCS, &code), 0);
    assert_eq!(count(ANNOTATIONS, &code), 2);
}

#[test]
fn console_false_keeps_console_calls() {
    let code = rake_presets(Options::default().with_console(false));
    assert_eq!(count(CONSOLE_CALLS, &code), 10);
    assert_eq!(count(DEBUGGER_STATEMENTS, &code), 0);
}

#[test]
fn debugger_false_keeps_debugger_statements() {
    let code = rake_presets(Options::default().with_debugger(false));
    assert_eq!(count(DEBUGGER_STATEMENTS, &code), 1);
    assert_eq!(count(CONSOLE_CALLS, &code), 0);
}

#[test]
fn callbacks_select_what_is_removed() {
    let code = rake_presets(
        Options::default()
            .with_license_filter(|comment| comment.contains("@license"))
            .with_doc_filter(|comment| comment.contains("@private"))
            .with_console_filter(|method, _| method.starts_with("group")),
    );
    assert_eq!(count(LICENSES, &code), 1);
    assert!(code.contains("A license"));
    assert_eq!(count(DOCS, &code), 1);
    assert!(code.contains("Some documentation without tags"));
    assert_eq!(count(CONSOLE_CALLS, &code), 8);
    assert!(!code.contains("console.group"));
}

#[test]
fn console_include_and_exclude_lists() {
    let include = ["dir", "group", "groupEnd"].map(String::from).to_vec();
    let code = rake_presets(Options::default().with_console_methods(Some(include), None));
    assert_eq!(count(CONSOLE_CALLS, &code), 6);

    let exclude = ["info", "warn", "error", "debug"].map(String::from).to_vec();
    let code = rake_presets(Options::default().with_console_methods(None, Some(exclude)));
    assert_eq!(count(CONSOLE_CALLS, &code), 4);
}

#[test]
fn application_preset() {
    let code = rake_presets(Options::default().with_preset(Preset::Application));
    assert_eq!(count(LICENSES, &code), 2);
    assert_eq!(count(DOCS, &code), 0);
    assert_eq!(count(ANNOTATIONS, &code), 0);
    assert_eq!(count(DEBUGGER_STATEMENTS, &code), 0);

    let methods: Vec<_> = Regex::new(CONSOLE_CALLS)
        .unwrap()
        .captures_iter(&code)
        .map(|c| c[1].to_string())
        .collect();
    assert_eq!(methods, ["info", "warn", "error", "debug"]);
}

#[test]
fn library_preset() {
    let code = rake_presets(Options::default().with_preset(Preset::Library));
    assert_eq!(count(LICENSES, &code), 2);
    assert_eq!(count(DOCS, &code), 2);
    assert_eq!(count(ANNOTATIONS, &code), 2);
    assert_eq!(count(DEBUGGER_STATEMENTS, &code), 0);
    assert_eq!(count(CONSOLE_CALLS, &code), 0);
    assert_eq!(count(LINE_COMMENTS, &code), 0);
    assert_eq!(count(BLOCK_COMMENTS, &code), 0);
}

#[test]
fn json_options_match_builder_options() {
    let options =
        Options::from_json(r#"{"preset": "library", "comments": {"docs": true}}"#).unwrap();
    let code = rake_presets(options);
    assert_eq!(count(LICENSES, &code), 2);
    assert_eq!(count(DOCS, &code), 0);
    assert_eq!(count(ANNOTATIONS, &code), 2);
}

#[test]
fn single_pass_removes_the_same_constructs() {
    let source = read_fixture("presets.js");
    let config = Options::default().with_preset(Preset::Application).resolve();
    let out = rake_all(&source, "presets.js", &config).unwrap().unwrap();

    assert_eq!(count(LICENSES, &out.code), 2);
    assert_eq!(count(DOCS, &out.code), 0);
    assert_eq!(count(ANNOTATIONS, &out.code), 0);
    assert_eq!(count(DEBUGGER_STATEMENTS, &out.code), 0);
    assert_eq!(count(CONSOLE_CALLS, &out.code), 4);

    let map = sourcemap::SourceMap::from_slice(out.map.as_bytes()).unwrap();
    assert_eq!(map.get_source(0), Some("presets.js"));
    let source_lines = source.lines().count() as u32;
    for token in map.tokens() {
        assert!(token.get_src_line() < source_lines);
    }

    // `const x = pure();` keeps pointing at its original line.
    let (line, _) = out
        .code
        .lines()
        .enumerate()
        .find(|(_, l)| l.starts_with("const x"))
        .unwrap();
    let token = map.lookup_token(line as u32, 0).unwrap();
    let original_line = source
        .lines()
        .position(|l| l.starts_with("const x"))
        .unwrap();
    assert_eq!(token.get_src_line(), original_line as u32);
}

#[test]
fn module_pass_map_is_valid_json() {
    let source = read_fixture("presets.js");
    let out = transform(&source, "presets.js", &Config::all())
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out.map).unwrap();
    assert_eq!(value["sources"], serde_json::json!(["presets.js"]));
    assert!(value.get("sourcesContent").is_none());
}
