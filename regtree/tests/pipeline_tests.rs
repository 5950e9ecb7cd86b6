//! Integration tests for the parse / generate / transform / optimize pipeline
//!
//! These tests go through the public API only.

use regtree::{
    Ast, Char, Handler, NodeKind, NodePath, OptimizeOptions, ParseOptions, RegexError, Visit,
    compat_transpile, generate, optimize, optimize_with, parse, parse_with, transform,
};

#[test]
fn test_round_trip_corpus() {
    let corpus = [
        "/abc/",
        "/a|b|c/",
        "/(?:a(b)c)+?/g",
        "/^\\d{3}-\\d{4}$/m",
        "/[^\\s\\S]/",
        "/(?<year>\\d{4})-(?<month>\\d{2})\\k<year>/",
        "/(?<=\\$)\\d+(?!px)/",
        "/\\p{Script=Latin}+\\P{Lu}/u",
        "/\\u{10FFFF}/u",
        "/[\\u0041-\\u005A]/",
        "/a{2}b{2,}c{2,3}?/",
        "/\\cM\\0\\n\\r\\t\\v\\f/",
        "/./s",
    ];
    for source in corpus {
        let ast = parse(source).unwrap();
        assert_eq!(generate(&ast), source, "Failed for input: {}", source);
    }
}

#[test]
fn test_parse_errors() {
    let cases = ["/(/", "/a{2,1}/", "/[z-a]/", "/*/", "abc", "/a/gg", "/(?<n>a)(?<n>b)/"];
    for source in cases {
        assert!(parse(source).is_err(), "Expected error for input: {}", source);
    }
}

#[test]
fn test_duplicate_names_allowed_on_request() {
    let options = ParseOptions {
        allow_group_name_duplicates: true,
        ..ParseOptions::default()
    };
    assert!(parse_with("/(?<n>a)|(?<n>b)/", &options).is_ok());
}

#[test]
fn test_locations() {
    let options = ParseOptions {
        capture_locations: true,
        ..ParseOptions::default()
    };
    let ast = parse_with("/a(bc)+/", &options).unwrap();
    let body = ast.body().unwrap();
    let repetition = ast.expressions(body)[1];
    let loc = ast.node(repetition).loc.as_ref().unwrap();
    assert_eq!(loc.source, "(bc)+");
    assert_eq!(loc.start.offset, 2);
    assert_eq!(loc.end.offset, 7);
}

/// Swaps every `a` for `b` and drops every `x`
struct SwapA;

impl Handler for SwapA {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        if let NodeKind::Char(c) = path.node(ast) {
            match c.value.as_str() {
                "a" => {
                    path.replace(ast, NodeKind::Char(Char::simple('b')));
                }
                "x" => path.remove(ast),
                _ => {}
            }
        }
        Visit::Continue
    }
}

#[test]
fn test_custom_handler() {
    let result = transform("/axaxa[ax]/", &mut [&mut SwapA]).unwrap();
    assert_eq!(result.to_string(), "/bbb[b]/");
}

/// Counts nodes, skipping everything inside groups
#[derive(Default)]
struct CountOutsideGroups {
    count: usize,
}

impl Handler for CountOutsideGroups {
    fn pre(&mut self, ast: &mut Ast, path: NodePath) -> Visit {
        self.count += 1;
        match path.node(ast) {
            NodeKind::Group(_) => Visit::Skip,
            _ => Visit::Continue,
        }
    }
}

#[test]
fn test_skip_children() {
    let mut counter = CountOutsideGroups::default();
    transform("/a(bcd)e/", &mut [&mut counter]).unwrap();
    // RegExp, Alternative, a, Group, e
    assert_eq!(counter.count, 5);
}

#[test]
fn test_optimizer_corpus() {
    let cases = [
        ("/[0-9]/", "/\\d/"),
        ("/[a-zA-Z_0-9]+/", "/\\w+/"),
        ("/a{1,2}a{2,3}/", "/a{3,5}/"),
        ("/(?:a)+/", "/a+/"),
        ("/[\\d\\d]/", "/\\d/"),
        ("/[^\\d]/", "/\\D/"),
        ("/\\x41/", "/A/"),
        ("/a{0,1}/", "/a?/"),
    ];
    for (input, expected) in cases {
        let result = optimize(input).unwrap();
        assert_eq!(result.to_string(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_optimizer_blacklist() {
    let options = OptimizeOptions {
        blacklist: vec!["char-class-to-meta".to_string()],
        ..OptimizeOptions::default()
    };
    let result = optimize_with("/[0-9]/", &options).unwrap();
    assert_eq!(result.to_string(), "/[0-9]/");
}

#[test]
fn test_optimizer_unknown_transform() {
    let options = OptimizeOptions {
        whitelist: vec!["notARule".to_string()],
        ..OptimizeOptions::default()
    };
    assert!(matches!(
        optimize_with("/a/", &options),
        Err(RegexError::UnknownTransform { .. })
    ));
}

#[test]
fn test_compat_then_native() {
    let result = compat_transpile("/(?<word>\\w+) \\k<word>/").unwrap();
    assert_eq!(result.to_string(), "/(\\w+) \\1/");

    let regex = result.to_regexp().unwrap();
    let found = regex.exec("say hello hello").unwrap();
    assert_eq!(found.index, 4);
    assert_eq!(found.named["word"].as_deref(), Some("hello"));
}

#[test]
fn test_exec_dot_all_and_x_flag() {
    let found = regtree::exec("/a.b/s", "a\nb").unwrap();
    assert!(found.is_some());

    let found = regtree::exec("/a b # trailing comment/x", "xab").unwrap().unwrap();
    assert_eq!(found.groups[0].as_deref(), Some("ab"));
}
