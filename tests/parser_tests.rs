//! Tests for the Python parser wrapper and syntax validation.

use jalon::{
    parser::{ParseResult, Parser, parse_document},
    queries::{FUNCTION_DEF_QUERY, IMPORT_QUERY},
    source::SourceDocument,
};

#[test]
fn parser_creates_successfully() {
    let code = r#"
def hello():
    print("Hello, World!")
"#;
    let parser = Parser::new(code.to_string());
    assert!(parser.is_ok());
}

#[test]
fn parser_extracts_functions() {
    let code = r#"
def read_sensor(sensor):
    return sensor.temperature

def publish_data(client, data):
    client.publish(data)

def main():
    pass
"#;
    let parser = Parser::new(code.to_string()).expect("parse");
    let matches = parser.query(FUNCTION_DEF_QUERY).expect("run query");
    let names: Vec<_> = matches.iter().filter_map(|m| m.get("name")).collect();

    assert_eq!(names.len(), 3);
    assert!(names.iter().any(|n| n.as_str() == "read_sensor"));
    assert!(names.iter().any(|n| n.as_str() == "publish_data"));
    assert!(names.iter().any(|n| n.as_str() == "main"));
}

#[test]
fn import_query_covers_all_three_forms() {
    let code = r#"
import time
import board as hw
from digitalio import DigitalInOut
"#;
    let parser = Parser::new(code.to_string()).expect("parse");
    let matches = parser.query(IMPORT_QUERY).expect("run query");
    let modules: Vec<_> = matches.iter().filter_map(|m| m.get("module")).collect();

    assert!(modules.iter().any(|m| m.as_str() == "time"));
    assert!(modules.iter().any(|m| m.as_str() == "board"));
    assert!(modules.iter().any(|m| m.as_str() == "digitalio"));
}

#[test]
fn clean_source_has_no_syntax_issue() {
    let parser = Parser::new("import time\nprint(time.monotonic())\n".to_string()).expect("parse");
    assert!(parser.syntax_issue().is_none());
}

#[test]
fn unclosed_call_is_reported_with_position() {
    let parser = Parser::new("x = 1\nprint(x\n".to_string()).expect("parse");
    let issue = parser.syntax_issue().expect("issue");
    assert_eq!(issue.line, 2);
    assert!(issue.column >= 1);
}

#[test]
fn parse_document_distinguishes_no_input_from_invalid() {
    let missing = parse_document(&SourceDocument::missing("main.py")).expect("parse");
    assert!(matches!(missing, ParseResult::NoInput));

    let invalid =
        parse_document(&SourceDocument::from_text("main.py", "while True\n    pass\n"))
            .expect("parse");
    assert!(invalid.issue().is_some());
}

#[test]
fn empty_present_file_is_valid_not_no_input() {
    let result = parse_document(&SourceDocument::from_text("main.py", "")).expect("parse");
    assert!(result.parser().is_some());
}
