//! Integration tests for the full pipeline
//!
//! Exercises tokenize, parse, validate, and evaluation together through the
//! public [`Interpreter`] API: accepted and rejected inputs, plugin calls,
//! environment seeding, and the per-statement commit behavior.

use corral::{
    Error, Interpreter, Key, PluginError, RuntimeError, Signature, Value,
};
use pretty_assertions::assert_eq;

/// Helper to run a program in a fresh interpreter
fn run(source: &str) -> corral::Result<Interpreter> {
    let mut interp = Interpreter::new();
    interp.parse(source)?;
    Ok(interp)
}

/// Helper to run a program and panic on failure
fn run_ok(source: &str) -> Interpreter {
    match run(source) {
        Ok(interp) => interp,
        Err(err) => panic!("failed to run {source:?}: {err}"),
    }
}

/// Helper to check that a program is rejected by a fresh interpreter
fn rejected(source: &str) -> Error {
    let mut interp = Interpreter::new();
    match interp.parse(source) {
        Ok(()) => panic!("expected {source:?} to be rejected"),
        Err(err) => {
            assert!(
                interp.env().is_empty(),
                "rejected program {source:?} leaked bindings"
            );
            err
        }
    }
}

fn register_repeat(interp: &mut Interpreter) {
    interp.plugins_mut().register(
        "repeat",
        Signature::positional(&["text", "count"]).unwrap(),
        |args, _| {
            let text = args[0]
                .as_str()
                .ok_or_else(|| PluginError::new("text must be a string"))?;
            let count = args[1]
                .as_int()
                .ok_or_else(|| PluginError::new("count must be an int"))?;
            Ok(Value::Str(text.repeat(count.max(0) as usize)))
        },
    );
}

#[test]
fn test_parse_string_input() {
    let interp = run_ok("a = 0");
    assert_eq!(interp.env().get("a").unwrap(), Value::Int(0));
    assert_eq!(interp.env().len(), 1);
}

#[test]
fn test_parse_reader_input() {
    let mut interp = Interpreter::new();
    interp
        .parse_reader(std::io::Cursor::new("a = 0"))
        .unwrap();
    assert_eq!(interp.env().get("a").unwrap(), Value::Int(0));
}

#[test]
fn test_multiple_inputs_accumulate() {
    let mut interp = Interpreter::new();
    interp.parse("a = 0").unwrap();
    interp.parse("b = 1").unwrap();
    assert_eq!(interp.env().get("a").unwrap(), Value::Int(0));
    assert_eq!(interp.env().get("b").unwrap(), Value::Int(1));
}

#[test]
fn test_seeded_environment() {
    let mut interp = Interpreter::seeded([("a".to_string(), Value::Int(0))]).unwrap();
    interp.parse("b = a").unwrap();
    assert_eq!(interp.env().get("b").unwrap(), Value::Int(0));
}

#[test]
fn test_safe_values() {
    let interp = run_ok(
        "valid = [
    None,
    False,
    True,
    0,
    1.0,
    '',
    [],
    {''},
    {'': 0},
]
",
    );
    let expected = Value::List(vec![
        Value::None,
        Value::Bool(false),
        Value::Bool(true),
        Value::Int(0),
        Value::Float(1.0),
        Value::Str(String::new()),
        Value::List(Vec::new()),
        Value::set([Key::from("")]),
        Value::dict([(Key::from(""), Value::Int(0))]),
    ]);
    assert_eq!(interp.env().get("valid").unwrap(), expected);
}

#[test]
fn test_syntax_errors_are_rejected() {
    for source in ["a b", "def = 1", "def", "= 1", "+++"] {
        assert!(
            matches!(rejected(source), Error::Syntax { .. }),
            "expected syntax error for {source:?}"
        );
    }
}

#[test]
fn test_unsafe_statements_are_rejected() {
    let bad_inputs = [
        "import os",
        "fn(x=lambda: None)",
        "list.append(1, b=2)",
        "def fn(): pass",
        "class A: pass",
        "for i in []: pass",
        "if i: pass",
        "a, b = [1, 2]",
        "a = b = 0",
        "print('')",
        "with fn() as f: pass",
        "1 + 1",
        "a = 1 + 1",
    ];
    for source in bad_inputs {
        rejected(source);
    }
}

#[test]
fn test_rebinding_overwrites() {
    let interp = run_ok("a = []\na = None");
    assert_eq!(interp.env().get("a").unwrap(), Value::None);
}

#[test]
fn test_plugin_names_cannot_be_bound() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    let err = interp.parse("repeat = 0").unwrap_err();
    assert!(matches!(err, Error::Grammar { .. }));
    assert!(interp.env().is_empty());
}

#[test]
fn test_reserved_names_are_rejected() {
    run_ok("__abc = 0");
    run_ok("abc__ = 0");
    let err = rejected("__abc__ = 0");
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::ReservedName { .. })
    ));
}

#[test]
fn test_previously_defined_names_are_visible() {
    let interp = run_ok("a = 0\nb = 1\nc = [a, b]");
    assert_eq!(
        interp.env().get("c").unwrap(),
        Value::List(vec![Value::Int(0), Value::Int(1)])
    );
}

#[test]
fn test_unregistered_function_calls_fail() {
    let err = rejected("a = len([])");
    assert_eq!(
        match err {
            Error::Runtime(err) => err,
            other => panic!("expected runtime error, got {other:?}"),
        },
        RuntimeError::unknown_function("len")
    );
}

#[test]
fn test_registered_plugins_execute() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    interp.parse("a = repeat('ab', 3)").unwrap();
    assert_eq!(interp.env().get("a").unwrap(), Value::Str("ababab".into()));
}

#[test]
fn test_keyword_arguments_bind_by_name() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    interp.parse("a = repeat(count=2, text='xy')").unwrap();
    assert_eq!(interp.env().get("a").unwrap(), Value::Str("xyxy".into()));
}

#[test]
fn test_argument_binding_failures() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    let err = interp.parse("a = repeat('x')").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::ArgumentBinding { .. })
    ));
    let err = interp.parse("a = repeat('x', 1, 2)").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::ArgumentBinding { .. })
    ));
    let err = interp.parse("a = repeat('x', 1, sep=',')").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::ArgumentBinding { .. })
    ));
    assert!(interp.env().is_empty());
}

#[test]
fn test_plugin_failure_is_reported_with_its_name() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    let err = interp.parse("a = repeat('x', 'y')").unwrap_err();
    match err {
        Error::Runtime(RuntimeError::PluginExecution { plugin, cause }) => {
            assert_eq!(plugin, "repeat");
            assert_eq!(cause, "count must be an int");
        }
        other => panic!("expected plugin execution error, got {other:?}"),
    }
    assert!(interp.env().is_empty());
}

#[test]
fn test_plugins_can_be_bound_as_values() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    interp.parse("fn = repeat").unwrap();
    match interp.env().get("fn").unwrap() {
        Value::Opaque(opaque) => assert_eq!(opaque.label(), "function repeat"),
        other => panic!("expected opaque value, got {other:?}"),
    }
}

#[test]
fn test_plugins_only_execute_by_registered_name() {
    let mut interp = Interpreter::new();
    register_repeat(&mut interp);
    let err = interp.parse("fn = repeat\na = fn('x', 1)").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::UnknownFunction { .. })
    ));
    // The first statement committed before the second failed
    assert!(interp.env().contains("fn"));
    assert!(!interp.env().contains("a"));
}

#[test]
fn test_bare_call_statements_run_for_effect() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "init",
        Signature::new(&[], &["env"]).unwrap(),
        |_, env| {
            let env = env.ok_or_else(|| PluginError::new("no environment"))?;
            env.set("initialized", Value::Bool(true))?;
            Ok(Value::None)
        },
    );
    interp.parse("init()").unwrap();
    assert_eq!(
        interp.env().get("initialized").unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_env_plugins_read_existing_bindings() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "pair",
        Signature::new(&["first", "second"], &["env"]).unwrap(),
        |args, env| {
            let env = env.ok_or_else(|| PluginError::new("no environment"))?;
            let first = args[0]
                .as_str()
                .ok_or_else(|| PluginError::new("first must be a name"))?;
            let second = args[1]
                .as_str()
                .ok_or_else(|| PluginError::new("second must be a name"))?;
            Ok(Value::Tuple(vec![env.get(first)?, env.get(second)?]))
        },
    );
    interp
        .parse("a = 1\nb = 2\nd = pair('a', 'b')")
        .unwrap();
    assert_eq!(
        interp.env().get("d").unwrap(),
        Value::Tuple(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn test_env_plugins_cannot_touch_reserved_names() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "read_reserved",
        Signature::new(&[], &["env"]).unwrap(),
        |_, env| {
            let env = env.ok_or_else(|| PluginError::new("no environment"))?;
            env.get("__env__")
        },
    );
    interp.plugins_mut().register(
        "write_reserved",
        Signature::new(&[], &["env"]).unwrap(),
        |_, env| {
            let env = env.ok_or_else(|| PluginError::new("no environment"))?;
            env.set("__a__", Value::Int(0))?;
            Ok(Value::None)
        },
    );
    for source in ["read_reserved()", "write_reserved()"] {
        let err = interp.parse(source).unwrap_err();
        assert!(
            matches!(err, Error::Runtime(RuntimeError::PluginExecution { .. })),
            "expected wrapped failure for {source:?}, got {err:?}"
        );
    }
    assert!(interp.env().is_empty());
}

#[test]
fn test_env_kwarg_cannot_be_supplied_from_source() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "probe",
        Signature::new(&[], &["env"]).unwrap(),
        |_, _| Ok(Value::None),
    );
    let err = interp.parse("a = probe(env=0)").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::ReservedName { .. })
    ));
}

#[test]
fn test_operator_rejection_leaves_no_binding() {
    let err = rejected("a = (1, 2) + (3,)");
    assert!(matches!(err, Error::Grammar { .. }));
}

#[test]
fn test_failed_statement_keeps_earlier_commits() {
    let mut interp = Interpreter::new();
    let err = interp.parse("a = 1\nb = len([])\nc = 3").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::UnknownFunction { .. })
    ));
    assert_eq!(interp.env().get("a").unwrap(), Value::Int(1));
    assert!(!interp.env().contains("b"));
    assert!(!interp.env().contains("c"));
}

#[test]
fn test_nested_reference_scenario() {
    let interp = run_ok("a = ['a', 'list']\nb = {'content': a}");
    let list = Value::List(vec![Value::Str("a".into()), Value::Str("list".into())]);
    assert_eq!(interp.env().get("a").unwrap(), list.clone());
    assert_eq!(
        interp.env().get("b").unwrap(),
        Value::dict([(Key::from("content"), list)])
    );
}

#[test]
fn test_list_building_plugin() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "fill",
        Signature::positional(&["item", "n"]).unwrap(),
        |mut args, _| {
            let n = args[1]
                .as_int()
                .ok_or_else(|| PluginError::new("n must be an int"))?;
            let item = args.remove(0);
            Ok(Value::List(vec![item; n.max(0) as usize]))
        },
    );
    interp.parse("a = fill('x', 3)").unwrap();
    assert_eq!(
        interp.env().get("a").unwrap(),
        Value::List(vec![Value::Str("x".into()); 3])
    );
}

#[test]
fn test_env_plugin_creates_new_binding() {
    let mut interp = Interpreter::new();
    interp.plugins_mut().register(
        "new_variable",
        Signature::new(&[], &["env"]).unwrap(),
        |_, env| {
            let env = env.ok_or_else(|| PluginError::new("no environment"))?;
            env.set("var", Value::Int(0))?;
            Ok(Value::None)
        },
    );
    interp.parse("new_variable()").unwrap();
    assert_eq!(interp.env().get("var").unwrap(), Value::Int(0));
}

#[test]
fn test_same_input_is_deterministic() {
    let source = "a = {'x': [1, 2], 'y': {3, 4}}\nb = (a, None)";
    let first = run_ok(source);
    let second = run_ok(source);
    assert_eq!(first.env().snapshot(), second.env().snapshot());
}

#[test]
fn test_parsing_composes_across_calls() {
    let combined = run_ok("a = 0\nb = [a]");
    let mut split = Interpreter::new();
    split.parse("a = 0").unwrap();
    split.parse("b = [a]").unwrap();
    assert_eq!(combined.env().snapshot(), split.env().snapshot());
}

#[test]
fn test_comments_and_blank_lines() {
    let interp = run_ok("# configuration\n\na = 1  # trailing\n\n# done\n");
    assert_eq!(interp.env().get("a").unwrap(), Value::Int(1));
}

#[test]
fn test_collection_values_render_like_source() {
    let interp = run_ok("a = {'k': [1, (2,)], 'j': {3}}");
    assert_eq!(
        interp.env().get("a").unwrap().to_string(),
        "{'k': [1, (2,)], 'j': {3}}"
    );
}
