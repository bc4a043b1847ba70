use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults_and_keywords() {
    let text = "def f(a, b=2):\n    return a * b\nf(3), f(3, b=4), f(b=5, a=1)\n";
    assert_eq!(results(text), vec!["(6, 12, 5)"]);
}

#[test]
fn argument_count_errors() {
    assert_eq!(
        failure("def f(a):\n    pass\nf(1, 2)\n").value,
        "f() takes exactly 1 argument (2 given)"
    );
    assert_eq!(
        failure("def g(a, b=1):\n    pass\ng()\n").value,
        "g() takes at least 1 argument (0 given)"
    );
    assert_eq!(
        failure("def h(a):\n    pass\nh(b=1)\n").value,
        "h() got an unexpected keyword argument 'b'"
    );
}

#[test]
fn closures_capture_enclosing_locals() {
    let text = "def outer(x):\n    def inner(y):\n        return x + y\n    return inner\nouter(1)(2)\n";
    assert_eq!(results(text), vec!["3"]);
}

#[test]
fn lambdas() {
    assert_eq!(results("(lambda x, y=1: x - y)(5)"), vec!["4"]);
    assert_eq!(results("f = lambda: 7\nf()"), vec!["7"]);
}

#[test]
fn functions_see_the_callers_globals() {
    let scope = chain(&["def f():\n    return y\n"]);
    assert_eq!(results_in(&scope, "y = 5\nf()"), vec!["5"]);
    assert_eq!(failure_in(&scope, "f()").value, "name 'y' is not defined");
}

#[test]
fn recursion() {
    let text = "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\nfact(20)\n";
    assert_eq!(results(text), vec!["2432902008176640000"]);
}

#[test]
fn docstrings_are_not_shown() {
    assert_eq!(
        results("def f():\n    'doc'\n    return 1\nf(), f.__doc__\n"),
        vec!["(1, 'doc')"]
    );
}

#[test]
fn bare_expressions_inside_functions_are_shown() {
    assert_eq!(
        results("def f():\n    'first'\n    2\nf()\n"),
        vec!["2"]
    );
}
