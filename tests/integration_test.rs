// Integration tests: whole programs run to completion

use cstep::interpreter::{Error, Interpreter, RuntimeError};
use cstep::memory::value::Value;
use cstep::parser::ast::{BaseType, Type};
use cstep::snapshot::{Event, Recorder};

fn run(source: &str) -> Interpreter<Recorder> {
    let mut interp =
        Interpreter::with_hooks(source, Recorder::new()).expect("Interpreter creation failed");
    interp.run().expect("Execution failed");
    interp
}

fn output(source: &str) -> Vec<String> {
    run(source).hooks().terminal.get_output()
}

#[test]
fn test_arithmetic_is_real_valued() {
    let source = r#"
        int main() {
            print(1 + 2 * 3);
            print(7 / 2);
            print(10 - 4 - 3);
            print(-(2 + 3));
        }
    "#;

    assert_eq!(output(source), vec!["7", "3.5", "3", "-5"]);
}

#[test]
fn test_comparisons() {
    let source = r#"
        int main() {
            print(1 < 2);
            print(2 >= 3);
            print(4 == 4);
            print(4 != 4);
            print("apple" < "banana");
        }
    "#;

    assert_eq!(output(source), vec!["true", "false", "true", "false", "true"]);
}

#[test]
fn test_function_call() {
    let source = r#"
        int add(int a, int b) {
            return a + b;
        }

        int main() {
            int result;
            result = add(3, 4);
            print(result);
        }
    "#;

    assert_eq!(output(source), vec!["7"]);
}

#[test]
fn test_early_return_skips_rest_of_body() {
    let source = r#"
        int f() {
            return 1;
            print(99);
        }

        int main() {
            print(f());
        }
    "#;

    assert_eq!(output(source), vec!["1"]);
}

#[test]
fn test_return_from_inside_loop() {
    let source = r#"
        int find(int limit) {
            int i;
            i = 0;
            while (1) {
                while (i * i > limit) {
                    return i;
                }
                i = i + 1;
            }
        }

        int main() {
            print(find(50));
        }
    "#;

    assert_eq!(output(source), vec!["8"]);
}

#[test]
fn test_recursion() {
    let source = r#"
        int fib(int n) {
            while (n < 2) {
                return n;
            }
            return fib(n - 1) + fib(n - 2);
        }

        int main() {
            print(fib(10));
        }
    "#;

    assert_eq!(output(source), vec!["55"]);
}

#[test]
fn test_deep_recursion_does_not_use_host_stack() {
    let source = r#"
        int down(int n) {
            while (n > 0) {
                return down(n - 1);
            }
            return 0;
        }

        int main() {
            print(down(20000));
        }
    "#;

    assert_eq!(output(source), vec!["0"]);
}

#[test]
fn test_struct_by_value() {
    let source = r#"
        struct Point {
            int x;
            int y;
        };

        int main() {
            Point p;
            print(p);
            p.x = 3;
            p.y = 4;
            print(p.x * p.y);
            print(p);
        }
    "#;

    assert_eq!(output(source), vec!["{x: 0, y: 0}", "12", "{x: 3, y: 4}"]);
}

#[test]
fn test_class_with_access_labels() {
    let source = r#"
        class Counter {
        public:
            int count;
        private:
            string label;
        };

        int main() {
            Counter c;
            c.count = c.count + 1;
            c.label = "clicks";
            print(c);
        }
    "#;

    assert_eq!(output(source), vec!["{count: 1, label: clicks}"]);
}

#[test]
fn test_arrays() {
    let source = r#"
        int main() {
            int a[3];
            int i;
            i = 0;
            while (i < 3) {
                a[i] = i * i;
                i = i + 1;
            }
            print(a[2]);
            print(a);
        }
    "#;

    assert_eq!(output(source), vec!["4", "[0, 1, 4]"]);
}

#[test]
fn test_two_dimensional_array() {
    let source = r#"
        int main() {
            int grid[2][3];
            grid[1][2] = 5;
            print(grid);
        }
    "#;

    assert_eq!(output(source), vec!["[[0, 0, 0], [0, 0, 5]]"]);
}

#[test]
fn test_linked_list_on_heap() {
    let source = r#"
        struct Node {
            int val;
            Node* next;
        };

        int main() {
            Node* head;
            head = malloc(Node);
            head->val = 1;
            head->next = malloc(Node);
            head->next->val = 2;
            print(head->val + head->next->val);
            print(head->next->next == NULL);
        }
    "#;

    let interp = run(source);
    assert_eq!(interp.hooks().terminal.get_output(), vec!["3", "false"]);

    let cells: Vec<(u64, String)> = interp
        .heap()
        .cells()
        .map(|(addr, value)| (addr, value.to_string()))
        .collect();
    assert_eq!(
        cells,
        vec![
            (10_000, "{val: 1, next: 10004}".to_string()),
            (10_004, "{val: 2, next: (unset)}".to_string()),
        ]
    );
}

#[test]
fn test_malloc_of_base_type() {
    let source = r#"
        int main() {
            int* p;
            p = malloc(int);
            *p;
        }
    "#;

    // Prefix `*` stops the run; the allocation has already happened
    let mut interp =
        Interpreter::with_hooks(source, Recorder::new()).expect("Interpreter creation failed");
    let err = interp.run().unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnsupportedOperator {
            operator: "*",
            arity: "unary"
        }
    );
    assert_eq!(interp.heap().load(10_000), Ok(&Value::Number(0.0)));
    assert_eq!(
        interp.hooks().events[1],
        Event::Allocation {
            ty: Type::Base(BaseType::Int),
            address: 10_000
        }
    );
}

#[test]
fn test_declaration_initializer_is_not_evaluated() {
    let source = r#"
        int main() {
            int x = 5;
            string s = "set";
            print(x);
            print(s);
        }
    "#;

    assert_eq!(output(source), vec!["0", ""]);
}

#[test]
fn test_arguments_evaluate_right_to_left() {
    let source = r#"
        int pick(int a, int b) {
            return a - b;
        }

        int main() {
            int x;
            int r;
            r = pick(x = 1, x = 2);
            print(r);
            print(x);
        }
    "#;

    let interp = run(source);
    assert_eq!(interp.hooks().terminal.get_output(), vec!["-1", "1"]);
    // x = 2 runs first, then x = 1, then the parameters are bound
    assert_eq!(
        interp.hooks().assigned_values()[..4],
        [
            Value::Number(2.0),
            Value::Number(1.0),
            Value::Number(1.0),
            Value::Number(2.0)
        ]
    );
}

#[test]
fn test_local_writes_mirror_into_globals() {
    let source = r#"
        void f() {
            int y;
            y = 7;
        }

        int main() {
            int y;
            y = 1;
            f();
            print(y);
        }
    "#;

    let interp = run(source);
    // main's own y is untouched by f
    assert_eq!(interp.hooks().terminal.get_output(), vec!["1"]);
    assert_eq!(interp.globals().get("y"), Some(&Value::Number(7.0)));
}

#[test]
fn test_mirrored_global_is_visible_to_other_functions() {
    let source = r#"
        void set() {
            int shared;
            shared = 42;
        }

        int main() {
            set();
            print(shared);
        }
    "#;

    assert_eq!(output(source), vec!["42"]);
}

#[test]
fn test_print_with_local_named_like_builtin() {
    let source = r#"
        void show(int print) {
            print = print + 1;
        }

        int main() {
            show(1);
            print(2);
        }
    "#;

    assert_eq!(output(source), vec!["2"]);
}

#[test]
fn test_function_end_hook_sees_return_values() {
    let source = r#"
        int one() {
            return 1;
        }

        void nothing() {
        }

        int main() {
            one();
            nothing();
        }
    "#;

    let interp = run(source);
    let ends: Vec<(String, Option<Value>)> = interp
        .hooks()
        .events
        .iter()
        .filter_map(|event| match event {
            Event::FnEnd { name, value } => Some((name.clone(), value.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(
        ends,
        vec![
            ("one".to_string(), Some(Value::Number(1.0))),
            ("nothing".to_string(), None),
            ("main".to_string(), None),
        ]
    );
}

#[test]
fn test_missing_main() {
    let result = Interpreter::new("int helper() { return 1; }");
    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::NoMainFunction))
    ));
}

#[test]
fn test_compile_errors_are_reported_before_running() {
    let result = Interpreter::new("int main() {\n    undefined_type x;\n}");
    assert!(matches!(result, Err(Error::Compile(_))));

    let result = Interpreter::new("struct A { A inner; }; int main() { }");
    assert!(matches!(result, Err(Error::Compile(_))));
}

#[test]
fn test_oversized_array_is_an_error() {
    let result = Interpreter::new("int main() {\n  int a[100000000000000];\n}");
    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::AllocationTooLarge { .. }))
    ));

    let result = Interpreter::new("int main() {\n  int grid[100000][100000];\n}");
    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::AllocationTooLarge { .. }))
    ));
}

#[test]
fn test_builtin_arity_is_fatal() {
    let mut interp = Interpreter::new("int main() {\n    print(1, 2);\n}")
        .expect("Interpreter creation failed");

    assert_eq!(
        interp.step(),
        Err(RuntimeError::ArgumentCountMismatch {
            function: "print".to_string(),
            expected: 1,
            got: 2
        })
    );
}

#[test]
fn test_undefined_variable_is_fatal() {
    let mut interp =
        Interpreter::new("int main() {\n    print(nope);\n}").expect("Interpreter creation failed");
    assert_eq!(
        interp.run(),
        Err(RuntimeError::UndefinedVariable {
            name: "nope".to_string()
        })
    );
}

#[test]
fn test_array_index_out_of_range_is_fatal() {
    let mut interp = Interpreter::new("int main() {\n    int a[2];\n    a[2] = 1;\n}")
        .expect("Interpreter creation failed");
    assert_eq!(
        interp.run(),
        Err(RuntimeError::IndexOutOfRange { index: 2, len: 2 })
    );
}
