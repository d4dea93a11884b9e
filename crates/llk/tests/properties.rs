//! Behavioural properties of the parse pipeline: ordered choice, lazy
//! repetition, tree shaping and error reporting.
use llk::{
    Error, Grammar, GrammarBuilder, Node, Parser, Record, RuleKey, SyntaxError, Token,
};

/// Splits `source` on spaces and classifies each word.
fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    for word in source.split(' ') {
        if !word.is_empty() {
            let name = match word {
                "+" => "T_PLUS".to_string(),
                "-" => "T_MINUS".to_string(),
                w if w.chars().all(|c| c.is_ascii_digit()) => "T_NUMBER".to_string(),
                w if w.chars().all(|c| c.is_ascii_alphabetic()) => {
                    format!("T_{}", w.to_uppercase())
                }
                _ => "T_UNKNOWN".to_string(),
            };
            tokens.push(Token::new(name, word, offset));
        }
        offset += word.len() + 1;
    }
    tokens
}

fn parse(grammar: Grammar, source: &str) -> Result<Node, Error> {
    Parser::new(grammar).parse(lex(source))
}

fn arithmetic() -> Grammar {
    GrammarBuilder::new()
        .alternation("Expression", [0u32, 1u32])
        .concatenation(0u32, ["Number", "Operation", "Expression"])
        .concatenation(1u32, ["Number", "Operation", "Number"])
        .alternation("Operation", ["Plus", "Minus"])
        .terminal("Number", "T_NUMBER", true)
        .terminal("Plus", "T_PLUS", true)
        .terminal("Minus", "T_MINUS", true)
        .build()
        .unwrap()
}

#[test]
fn test_parsing_is_deterministic() {
    let parser = Parser::new(arithmetic());
    let source = "2 + 2 - 10 + 1000";

    let first = parser.trace(lex(source)).unwrap();
    let second = parser.trace(lex(source)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        parser.parse(lex(source)).unwrap(),
        parser.parse(lex(source)).unwrap()
    );
}

#[test]
fn test_first_alternative_wins() {
    // A -> x | x y, followed by an optional y.
    let grammar = |alternatives: [RuleKey; 2]| {
        GrammarBuilder::new()
            .concatenation("Root", ["A", "Rest"])
            .alternation("A", alternatives)
            .concatenation(0u32, ["x", "y"])
            .optional("Rest", "y")
            .terminal("x", "T_X", true)
            .terminal("y", "T_Y", true)
            .build()
            .unwrap()
    };

    let short_first = parse(grammar(["x".into(), 0u32.into()]), "x y").unwrap();
    let long_first = parse(grammar([0u32.into(), "x".into()]), "x y").unwrap();
    assert_ne!(short_first, long_first);

    let expected = "\
>  Root
>  >  A
>  >  >  token(T_X, x)
>  >  Rest
>  >  >  token(T_Y, y)";
    assert_eq!(short_first.to_string(), expected);

    let expected = "\
>  Root
>  >  A
>  >  >  token(T_X, x)
>  >  >  token(T_Y, y)";
    assert_eq!(long_first.to_string(), expected);
}

/// A -> B* C, where B and C both wrap the same token.
fn greedy_candidates() -> Grammar {
    GrammarBuilder::new()
        .concatenation("A", [0u32.into(), RuleKey::from("C")])
        .repetition(0u32, "B", 0, None)
        .concatenation("B", ["t"])
        .concatenation("C", ["t"])
        .terminal("t", "T_T", true)
        .build()
        .unwrap()
}

#[test]
fn test_repetition_defaults_to_minimum() {
    let tree = parse(greedy_candidates(), "t").unwrap();
    assert!(tree.first("B", None).is_none());
    assert_eq!(tree.child(0).map(Node::name), Some("C"));
}

#[test]
fn test_repetition_extends_when_forced() {
    let tree = parse(greedy_candidates(), "t t").unwrap();
    let names: Vec<_> = tree.children().iter().map(Node::name).collect();
    assert_eq!(names, ["B", "C"]);
}

#[test]
fn test_repetition_extends_only_as_far_as_needed() {
    // A -> B{1,3} end
    let grammar = GrammarBuilder::new()
        .concatenation("A", ["Bs", "end"])
        .repetition("Bs", "b", 1, Some(3))
        .terminal("b", "T_B", true)
        .terminal("end", "T_END", true)
        .build()
        .unwrap();
    let parser = Parser::new(grammar);

    let tree = parser.parse(lex("b b end")).unwrap();
    let bs = tree.first("Bs", None).unwrap();
    assert_eq!(bs.children().len(), 2);

    let trace = parser.trace(lex("b b end")).unwrap();
    let bs_id = parser.grammar().id_by_name("Bs").unwrap();
    let committed: Vec<_> = trace
        .iter()
        .filter_map(|record| match record {
            Record::Exit { call, .. } if call.rule == bs_id => Some(call.state),
            _ => None,
        })
        .collect();
    assert_eq!(committed, [2]);

    assert!(parser.parse(lex("b b b b end")).is_err());
}

#[test]
fn test_empty_derivations_are_elided() {
    // A -> B? ; B -> x
    let grammar = || {
        GrammarBuilder::new()
            .optional("A", "B")
            .concatenation("B", ["x"])
            .concatenation("Root", ["A", "z"])
            .terminal("x", "T_X", true)
            .terminal("z", "T_Z", true)
            .build()
            .unwrap()
    };

    let tree = parse(grammar(), "").unwrap();
    assert_eq!(tree.name(), "A");
    assert!(tree.children().is_empty());
    assert!(tree.first("B", None).is_none());

    let parser = Parser::with_config(
        grammar(),
        llk::ParserConfig {
            root: Some("Root".to_string()),
            ..llk::ParserConfig::default()
        },
    )
    .unwrap();
    let tree = parser.parse(lex("z")).unwrap();
    assert_eq!(tree.to_string(), ">  Root\n>  >  token(T_Z, z)");
}

#[test]
fn test_transitional_rules_are_flattened() {
    let grammar = GrammarBuilder::new()
        .concatenation("Root", [0u32.into(), RuleKey::from("z")])
        .concatenation(0u32, ["Named"])
        .concatenation("Named", ["x"])
        .terminal("x", "T_X", true)
        .terminal("z", "T_Z", true)
        .build()
        .unwrap();

    let tree = parse(grammar, "x z").unwrap();
    let names: Vec<_> = tree.children().iter().map(Node::name).collect();
    assert_eq!(names, ["Named", "T_Z"]);
    assert_eq!(tree.depth(), 2);
}

#[test]
fn test_backtracking_rewinds_consumed_tokens() {
    // A -> x y | x z
    let grammar = GrammarBuilder::new()
        .alternation("A", [0u32, 1u32])
        .concatenation(0u32, ["x", "y"])
        .concatenation(1u32, ["x", "z"])
        .terminal("x", "T_X", true)
        .terminal("y", "T_Y", true)
        .terminal("z", "T_Z", true)
        .build()
        .unwrap();

    let tree = parse(grammar, "x z").unwrap();
    assert_eq!(tree.name(), "A");
    assert_eq!(tree.text(), "xz");
    assert_eq!(tree.child(1).map(Node::offset), Some(2));
}

#[test]
fn test_arithmetic_expression() {
    let tree = parse(arithmetic(), "2 + 2 - 10 + 1000").unwrap();

    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.find("Expression", None).len(), 3);
    assert_eq!(tree.find("Operation", None).len(), 3);

    let numbers: Vec<_> = tree
        .find("T_NUMBER", None)
        .into_iter()
        .filter_map(Node::value)
        .collect();
    assert_eq!(numbers, ["2", "2", "10", "1000"]);

    let operation = tree.first("Operation", None).unwrap();
    assert_eq!(operation.offset(), 2);
    assert_eq!(operation.child(0).and_then(Node::value), Some("+"));

    // Right nesting: each level holds one number and one operation.
    let innermost = tree.find("Expression", None)[2];
    assert_eq!(innermost.text(), "10+1000");
}

#[test]
fn test_failure_reports_furthest_token() {
    let grammar = GrammarBuilder::new()
        .concatenation("A", ["x", "y"])
        .terminal("x", "T_X", true)
        .terminal("y", "T_Y", true)
        .build()
        .unwrap();

    match parse(grammar, "x z") {
        Err(Error::Syntax(SyntaxError::UnexpectedToken { token })) => {
            assert_eq!(token.offset, 2);
            assert_eq!(token.value, "z");
        }
        other => panic!("expected an unexpected token error, got {other:?}"),
    }
}

#[test]
fn test_failure_at_end_of_input() {
    let err = parse(arithmetic(), "2 +").unwrap_err();
    assert_eq!(err, Error::Syntax(SyntaxError::UnexpectedEnd { offset: 3 }));
}

#[test]
fn test_unrecognized_token() {
    let err = parse(arithmetic(), "2 + ?").unwrap_err();
    match err {
        Error::Syntax(SyntaxError::UnrecognizedToken { token }) => {
            assert_eq!(token.offset, 4);
        }
        other => panic!("expected an unrecognized token error, got {other:?}"),
    }
}

#[test]
fn test_json_grammar_end_to_end() {
    let grammar = llk::parse_grammar(
        r#"{
            "rules": [
                {"id": "List", "type": "CONCATENATION", "members": ["Item", "0"]},
                {"id": "0", "type": "REPETITION", "members": ["1"]},
                {"id": "1", "type": "CONCATENATION", "members": ["Comma", "Item"]},
                {"id": "Item", "type": "TERMINAL", "token": "T_NUMBER"},
                {"id": "Comma", "type": "TERMINAL", "token": "T_COMMA", "kept": false}
            ]
        }"#,
    )
    .unwrap();

    let tokens = vec![
        Token::new("T_NUMBER", "1", 0),
        Token::new("T_COMMA", ",", 1),
        Token::new("T_NUMBER", "2", 3),
        Token::new("T_COMMA", ",", 4),
        Token::new("T_NUMBER", "3", 6),
    ];
    let tree = Parser::new(grammar).parse(tokens).unwrap();
    assert_eq!(tree.name(), "List");
    assert_eq!(tree.text(), "123");
    assert_eq!(tree.children().len(), 3);
}

#[test]
fn test_grammar_is_shared_across_threads() {
    let grammar = arithmetic();
    let sources = ["1 + 2", "3 - 4 + 5", "6 - 7"];

    let trees: Vec<Node> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let grammar = &grammar;
                scope.spawn(move || {
                    let mut tokens = llk::TokenBuffer::new(lex(source));
                    llk::Runtime::new(grammar).parse(&mut tokens)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                let trace = handle.join().unwrap().unwrap();
                llk::build(&trace, &grammar).unwrap()
            })
            .collect()
    });

    let texts: Vec<_> = trees.iter().map(Node::text).collect();
    assert_eq!(texts, ["1+2", "3-4+5", "6-7"]);
}
