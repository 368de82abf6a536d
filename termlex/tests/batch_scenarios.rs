use assert_matches::assert_matches;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use termlex::batch::{self, BatchConfig, BatchError};
use termlex::naming::{is_legal, SubstitutionError};
use termlex::{LexerSpec, SubstitutionTable, TokenRecord, TokenizeError};

const EXPR_GRAMMAR: &str = r"
grammar Expr;

stat : NAME '=' expr ;
expr : expr '+' expr | expr '++' | NUMBER | NAME ;

ASSIGN : '=' ;
NAME   : [a-zA-Z_] [a-zA-Z_0-9]* ;
NUMBER : [0-9]+ ;
WS     : [ \t\r\n]+ -> skip ;
";

struct Workspace {
    _root: TempDir,
    grammar: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new(inputs: &[(&str, &str)]) -> Self {
        let root = tempdir().unwrap();
        let grammar = root.path().join("Expr.g4");
        let input = root.path().join("in");
        let output = root.path().join("out");
        fs::write(&grammar, EXPR_GRAMMAR).unwrap();
        fs::create_dir(&input).unwrap();
        fs::create_dir(&output).unwrap();
        for (name, content) in inputs {
            fs::write(input.join(name), content).unwrap();
        }
        Self {
            _root: root,
            grammar,
            input,
            output,
        }
    }

    fn run(&self, lexer: &str, table: &SubstitutionTable) -> Result<batch::BatchResults, BatchError> {
        let engine = LexerSpec::parse(lexer).load().unwrap();
        let config = BatchConfig {
            progress_reporting: false,
            ..BatchConfig::default()
        };
        batch::run(engine.as_ref(), table, &self.input, &self.output, &config)
    }

    fn run_grammar(&self, table: &SubstitutionTable) -> Result<batch::BatchResults, BatchError> {
        self.run(self.grammar.to_str().unwrap(), table)
    }

    fn artifact(&self, name: &str) -> Vec<TokenRecord> {
        let text = fs::read_to_string(self.output.join(name)).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

fn plus_table() -> SubstitutionTable {
    SubstitutionTable::from_json_str(r#"{"+": "PLUS"}"#).unwrap()
}

fn shipped_table() -> SubstitutionTable {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../resources/name_substitutions.json");
    SubstitutionTable::load(&path).unwrap()
}

#[test]
fn grammar_mode_names_terminals() {
    let workspace = Workspace::new(&[("a.txt", "x = 1 + 2")]);
    workspace.run_grammar(&plus_table()).unwrap();

    assert_eq!(
        workspace.artifact("a.json"),
        vec![
            TokenRecord::new("NAME", "x"),
            TokenRecord::new("ASSIGN", "="),
            TokenRecord::new("NUMBER", "1"),
            TokenRecord::new("Lit_PLUS", "+"),
            TokenRecord::new("NUMBER", "2"),
        ]
    );
}

#[test]
fn missing_substitution_aborts_batch() {
    let workspace = Workspace::new(&[("inc.txt", "i ++")]);

    let error = workspace.run_grammar(&plus_table()).unwrap_err();
    assert_eq!(error.error_code().as_str(), "E003");
    assert_matches!(
        error,
        BatchError::File {
            source: TokenizeError::Substitution(SubstitutionError::MissingEntry { ref literal }),
            ..
        } if literal == "++"
    );
    assert!(!workspace.output.join("inc.json").exists());
}

#[test]
fn one_artifact_per_input() {
    let workspace = Workspace::new(&[
        ("one.src", "a = 1"),
        ("two.src", "b = a + 1"),
        ("three.data.src", ""),
    ]);

    let results = workspace.run_grammar(&plus_table()).unwrap();
    assert_eq!(results.success_count(), 3);

    let mut written: Vec<String> = fs::read_dir(&workspace.output)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["one.json", "three.data.json", "two.json"]);
    assert!(workspace.artifact("three.data.json").is_empty());
}

#[test]
fn reruns_are_byte_identical() {
    let workspace = Workspace::new(&[("a.txt", "x = 1 + 2\ny = x")]);
    let table = plus_table();

    workspace.run_grammar(&table).unwrap();
    let first = fs::read(workspace.output.join("a.json")).unwrap();
    workspace.run_grammar(&table).unwrap();
    let second = fs::read(workspace.output.join("a.json")).unwrap();

    assert_eq!(first, second);
    assert!(!first.ends_with(b"\n"));
}

#[test]
fn python3_mode_end_to_end() {
    let source = "def add(a, b):\n    return a + b\n\nprint(add(1, 2))  # 3\n";
    let workspace = Workspace::new(&[("add.py", source)]);

    workspace.run("python3", &shipped_table()).unwrap();

    let records = workspace.artifact("add.json");
    let terminals: Vec<&str> = records.iter().map(|r| r.terminal.as_str()).collect();
    assert_eq!(
        terminals,
        vec![
            "Lit_def", "NAME", "Lit_LPAR", "NAME", "Lit_COMMA", "NAME", "Lit_RPAR", "Lit_COLON",
            "NEWLINE", "INDENT", "Lit_return", "NAME", "Lit_PLUS", "NAME", "NEWLINE", "DEDENT",
            "NAME", "Lit_LPAR", "NAME", "Lit_LPAR", "NUMBER", "Lit_COMMA", "NUMBER", "Lit_RPAR",
            "Lit_RPAR", "NEWLINE",
        ]
    );
    assert!(records.iter().all(|r| is_legal(&r.terminal)));
}

#[test]
fn shipped_table_covers_python3_literals() {
    let table = shipped_table();
    let engine = LexerSpec::parse("python3").load().unwrap();
    let vocabulary = engine.vocabulary();

    for category in 1..=vocabulary.max_token_type() {
        if vocabulary.symbolic_name(category).is_some() {
            continue;
        }
        let quoted = vocabulary.literal_name(category).unwrap();
        let literal = &quoted[1..quoted.len() - 1];
        assert!(
            is_legal(literal) || table.contains(literal),
            "no substitution for {quoted}"
        );
    }
}
