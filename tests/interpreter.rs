use minibc::{Interpreter, Resolve};

fn run(script: &str) -> (Interpreter, String) {
    let mut interp = Interpreter::new();
    let mut out = Vec::new();
    let failures = interp.run(script, &mut out);
    assert_eq!(failures, 0, "script failed:\n{script}");
    (interp, String::from_utf8(out).expect("utf8 output"))
}

#[test]
fn literal_assignments_store_floats() {
    let (interp, _) = run("x  = 3\ny  = 5");
    assert_eq!(interp.store().get("x"), 3.0);
    assert_eq!(interp.store().get("y"), 5.0);
}

#[test]
fn pipeline_round_trip() {
    let interp = Interpreter::new();
    assert_eq!(interp.eval_expression("2 + 3 * 4").unwrap(), 14.0);
}

#[test]
fn parentheses_and_caret_associativity() {
    let interp = Interpreter::new();
    assert_eq!(interp.eval_expression("(2 + 3) * 4").unwrap(), 20.0);
    // ties pop in the converter, so ^ chains left: (2^3)^2, not 2^(3^2)
    assert_eq!(interp.eval_expression("2 ^ 3 ^ 2").unwrap(), 64.0);
}

#[test]
fn unary_minus_in_assignment() {
    let (interp, _) = run("x = 1 + -2");
    assert_eq!(interp.store().get("x"), -1.0);
}

#[test]
fn increment_from_zero() {
    let (interp, _) = run("x++");
    assert_eq!(interp.store().get("x"), 1.0);
    let (interp, _) = run("++x");
    assert_eq!(interp.store().get("x"), 1.0);
}

#[test]
fn relational_results_are_zero_or_one() {
    let interp = Interpreter::new();
    assert_eq!(interp.eval_expression("2 < 1").unwrap(), 0.0);
    assert_eq!(interp.eval_expression("1 < 2").unwrap(), 1.0);
}

#[test]
fn unbound_identifier_prints_zero() {
    let (_, output) = run("print y");
    assert_eq!(output, "0\n");
}

#[test]
fn print_is_idempotent_without_intervening_assignment() {
    let (mut interp, _) = run("x = 2");
    let mut first = Vec::new();
    let mut second = Vec::new();
    interp.process("print x ^ 2, x", &mut first).unwrap();
    interp.process("print x ^ 2, x", &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mixed_arithmetic_relational_and_variables() {
    let (interp, output) = run(
        "x  = 3\n\
         y  = 5\n\
         x = 1 + -2\n\
         z  = 2 + x * y\n\
         z2 = (2 + x) * y * (2<1)\n\
         print x, y, z, z2",
    );
    assert_eq!(interp.store().get("z"), -3.0);
    assert_eq!(interp.store().get("z2"), 0.0);
    assert_eq!(output, "-1 5 -3 0\n");
}

#[test]
fn circle_area_script() {
    let (_, output) = run(
        "pi = 3.14159\n\
         r = 2\n\
         area = pi * r^2\n\
         print area",
    );
    assert_eq!(output, "12.56636\n");
}

#[test]
fn boolean_operators_over_truthiness() {
    let (_, output) = run("print 0 || 0, 2 && 3, !0");
    assert_eq!(output, "0 1 1\n");
}

#[test]
fn failures_are_counted_and_do_not_stop_the_batch() {
    let mut interp = Interpreter::new();
    let mut out = Vec::new();
    let failures = interp.run(
        "a = 1\n\
         b = 1 / 0\n\
         c = (1 + 2\n\
         what is this\n\
         d = a + 1\n\
         print d",
        &mut out,
    );
    assert_eq!(failures, 3);
    assert!(!interp.store().contains("b"));
    assert!(!interp.store().contains("c"));
    assert_eq!(interp.store().get("d"), 2.0);
    assert_eq!(String::from_utf8(out).unwrap(), "2\n");
}

#[test]
fn deferred_resolution_is_available_behind_the_flag() {
    let mut interp = Interpreter::with_resolve(Resolve::Deferred);
    let mut out = Vec::new();
    assert_eq!(interp.run("x = 2\ny = x ^ 3\nprint y", &mut out), 0);
    assert_eq!(String::from_utf8(out).unwrap(), "8\n");
}
