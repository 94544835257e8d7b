#[cfg(test)]
mod tests {
    use crate::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn run(source: &str, input: &str) -> Result<String> {
        let mut program = compile(source)?;
        let mut output = Vec::new();
        program.execute(Cursor::new(input.as_bytes()), &mut output)?;
        Ok(String::from_utf8(output).expect("output is utf-8"))
    }

    fn run_ok(source: &str, input: &str) -> String {
        run(source, input).expect("program should run")
    }

    // The concrete scenarios the language is specified through.

    #[test]
    fn hello_compute() {
        assert_eq!(run_ok("a = 2; b = 3; print a * b + 1;", ""), "7\n");
    }

    #[test]
    fn read_and_echo() {
        assert_eq!(run_ok("x = ?; print x;", "42\n"), "42\n");
    }

    #[test]
    fn branching_on_input_sign() {
        let source = "x = ?; if (x > 0) print 1; else print -1;";
        assert_eq!(run_ok(source, "-5\n"), "-1\n");
    }

    #[test]
    fn loop_summation() {
        let source = "n = ?; s = 0; i = 0; while (i < n) { i = i + 1; s = s + i; } print s;";
        assert_eq!(run_ok(source, "5\n"), "15\n");
    }

    #[test]
    fn scope_reclaim_makes_the_name_undefined() {
        let err = run("{ y = 7; } print y;", "").unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref name, .. } if name == "y"));
        assert!(err.is_compile_error());
    }

    #[test]
    fn conditionally_skipped_declaration_fails_at_runtime() {
        let err = run("{ if (0) y = 1; print y; }", "").unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref name, .. } if name == "y"));
        assert!(!err.is_compile_error());
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let err = run("print 10 / 0;", "").unwrap_err();
        assert!(matches!(err, Error::DivisionByZero { .. }));
        assert!(!err.is_compile_error());
    }

    // Language behaviors beyond the six scenarios.

    #[test]
    fn assignment_chain_is_right_associative() {
        let mut program = compile("a = b = c = 5;").unwrap();
        program.execute(Cursor::new(&b""[..]), Vec::<u8>::new()).unwrap();
        for name in ["a", "b", "c"] {
            let slot = program.symtab.lookup(name).expect("name survives at top level");
            assert_eq!(program.symtab.get(slot), 5);
        }
    }

    #[test]
    fn final_table_size_counts_top_level_targets() {
        let mut program =
            compile("a = 1; b = a; { tmp = a + b; a = tmp; } a = b = 9; c = 0;").unwrap();
        program.execute(Cursor::new(&b""[..]), Vec::<u8>::new()).unwrap();
        assert_eq!(program.symtab.len(), 3); // a, b, c
    }

    #[test]
    fn nested_scopes_reclaim_in_order() {
        let source = "a = 0; { b = 1; { c = b + 1; a = c; } } print a;";
        assert_eq!(run_ok(source, ""), "2\n");
        let mut program = compile(source).unwrap();
        program.execute(Cursor::new(&b""[..]), Vec::<u8>::new()).unwrap();
        assert_eq!(program.symtab.len(), 1);
    }

    #[test]
    fn empty_statements_are_inert() {
        assert_eq!(run_ok(";;; a = 1; ; print a;", ""), "1\n");
    }

    #[test]
    fn print_forwards_its_value() {
        assert_eq!(run_ok("x = print print 3; print x;", ""), "3\n3\n3\n");
    }

    #[test]
    fn while_loop_that_never_runs() {
        assert_eq!(run_ok("i = 10; while (i < 10) i = i + 1; print i;", ""), "10\n");
    }

    #[test]
    fn euclid_gcd_end_to_end() {
        let source = "
            a = ?; b = ?;
            while (b != 0) {
                t = b;
                b = a % b;
                a = t;
            }
            print a;
        ";
        assert_eq!(run_ok(source, "48 36\n"), "12\n");
        assert_eq!(run_ok(source, "17 5\n"), "1\n");
    }

    #[test]
    fn logical_operators_do_not_short_circuit() {
        let err = run("x = 0; print (x > 0) && (1 / x);", "").unwrap_err();
        assert!(matches!(err, Error::DivisionByZero { .. }));
    }

    #[test]
    fn runtime_errors_carry_a_location() {
        let err = run("a = 1;\nprint a / 0;", "").unwrap_err();
        let loc = err.loc().expect("runtime errors point at their node");
        assert_eq!(loc.first_line, 1);
    }

    #[test]
    fn lex_error_stops_before_execution() {
        let err = run("print 1; $", "").unwrap_err();
        assert!(matches!(err, Error::Lex { .. }));
    }

    // Quantified invariants, driven by proptest (the integer tables are
    // checked against native i64 semantics).

    proptest! {
        #[test]
        fn printing_a_sum_matches_native_arithmetic(a in -1000000i64..1000000, b in -1000000i64..1000000) {
            let source = format!("x = {a}; y = {b}; print x + y; print x * y; print x - y;");
            let expected = format!("{}\n{}\n{}\n", a + b, a * b, a - b);
            prop_assert_eq!(run_ok(&source, ""), expected);
        }

        #[test]
        fn division_and_modulo_truncate_toward_zero(a in -10000i64..10000, b in -10000i64..10000) {
            prop_assume!(b != 0);
            let source = format!("x = {a}; y = {b}; print x / y; print x % y;");
            let expected = format!("{}\n{}\n", a / b, a % b);
            prop_assert_eq!(run_ok(&source, ""), expected);
        }

        #[test]
        fn comparisons_agree_with_native_ordering(a in -100i64..100, b in -100i64..100) {
            let source = format!("x = {a}; y = {b}; print x < y; print x <= y; print x == y; print x != y;");
            let expected = format!(
                "{}\n{}\n{}\n{}\n",
                (a < b) as i64,
                (a <= b) as i64,
                (a == b) as i64,
                (a != b) as i64
            );
            prop_assert_eq!(run_ok(&source, ""), expected);
        }

        #[test]
        fn read_then_print_is_identity_on_any_integer(n in any::<i64>()) {
            let input = format!("{n}\n");
            prop_assert_eq!(run_ok("print ?;", &input), format!("{n}\n"));
        }

        #[test]
        fn assignment_yields_the_assigned_value(n in any::<i64>()) {
            let input = format!("{n}\n");
            prop_assert_eq!(run_ok("print x = ?;", &input), format!("{n}\n"));
        }
    }
}
