use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, RuntimeError, Unwind};
use crate::expr::*;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, Type};

type ExecResult<T> = Result<T, Unwind>;

/// Checks that both operands are numbers and hands them back unwrapped.
fn check_number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), Unwind> {
    match (left.as_number(), right.as_number()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(RuntimeError {
            token: operator.clone(),
            message: "Operands must be numbers.".to_string(),
        }.into()),
    }
}

/// Walks the syntax tree and executes it.
///
/// The interpreter owns the global environment, which outlives any single
/// run so that the REPL accumulates state, and the side table of variable
/// resolution distances filled in by the resolver. Print output goes to the
/// writer supplied at construction; the binary passes stdout and tests
/// capture a buffer.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::NativeFunction(native));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Executes the statements in order. A runtime error aborts the run and
    /// is reported here; the return signal never reaches this level.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                match unwind {
                    Unwind::Error(error) => error.throw(),
                    Unwind::Return(_) => unreachable!("return signal escaped the call stack"),
                }
                return;
            }
        }
    }

    /// Records the scope distance of a resolved variable reference.
    /// Called by the resolver ahead of execution.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult<()> {
        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(())
            },
            Stmt::Print(data) => self.visit_print_stmt(data),
            Stmt::Var(data) => self.visit_var_stmt(data),
            Stmt::Block(data) => {
                let environment = Environment::new(Some(Rc::clone(&self.environment)));
                self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
            },
            Stmt::If(data) => self.visit_if_stmt(data),
            Stmt::While(data) => self.visit_while_stmt(data),
            Stmt::Function(data) => self.visit_function_stmt(data),
            Stmt::Return(data) => self.visit_return_stmt(data),
            Stmt::Class(data) => self.visit_class_stmt(data),
        }
    }

    /// Executes the statements against the given environment and restores
    /// the previous one on every exit path, including errors and returns.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult<()> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn visit_print_stmt(&mut self, data: &PrintData) -> ExecResult<()> {
        let value = self.evaluate(&data.expr)?;
        writeln!(self.output, "{value}").expect("output stream to be writable");
        Ok(())
    }

    fn visit_var_stmt(&mut self, data: &VarData) -> ExecResult<()> {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Literal(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_if_stmt(&mut self, data: &IfData) -> ExecResult<()> {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, data: &WhileData) -> ExecResult<()> {
        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, data: &FunctionData) -> ExecResult<()> {
        let function = Function::new(data, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::Function(function));
        Ok(())
    }

    fn visit_return_stmt(&mut self, data: &ReturnData) -> ExecResult<()> {
        let value = match &data.value {
            Some(value) => self.evaluate(value)?,
            None => Object::Literal(Literal::Nil),
        };

        // Unwind back to the call frame; Function::call catches this.
        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> ExecResult<()> {
        let superclass = match &data.superclass {
            Some(superclass) => {
                let Expr::Variable(variable) = superclass else { unreachable!() };

                match self.evaluate(superclass)? {
                    Object::Class(class) => Some(class),
                    _ => {
                        return Err(RuntimeError {
                            token: variable.name.clone(),
                            message: "Superclass must be a class.".to_string(),
                        }.into());
                    },
                }
            },
            None => None,
        };

        // Defining the name before the value exists lets methods refer to
        // the class by name through their closure.
        self.environment.borrow_mut().define(&data.name.lexeme, Object::Literal(Literal::Nil));

        // Methods of a subclass close over an extra scope binding `super`.
        if let Some(superclass) = &superclass {
            let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
            environment.define("super", Object::Class(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            let is_initializer = function.name.lexeme == "init";
            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment), is_initializer),
            );
        }

        let class = Class::new(data.name.lexeme.clone(), superclass.clone(), methods);

        if superclass.is_some() {
            let enclosing = self.environment.borrow().enclosing.clone()
                .expect("super scope to have an enclosing environment");
            self.environment = enclosing;
        }

        self.environment.borrow_mut().assign(&data.name, Object::from(class))?;
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> ExecResult<Object> {
        match expr {
            Expr::Literal(literal) => Ok(Object::from(literal.clone())),
            Expr::Unary(data) => self.visit_unary_expr(data),
            Expr::Binary(data) => self.visit_binary_expr(data),
            Expr::Logical(data) => self.visit_logical_expr(data),
            Expr::Grouping(data) => self.evaluate(&data.expr),
            Expr::Variable(data) => Ok(self.look_up_variable(&data.name)?),
            Expr::Assign(data) => self.visit_assign_expr(data),
            Expr::Call(data) => self.visit_call_expr(data),
            Expr::Get(data) => self.visit_get_expr(data),
            Expr::Set(data) => self.visit_set_expr(data),
            Expr::This(data) => Ok(self.look_up_variable(&data.keyword)?),
            Expr::Super(data) => self.visit_super_expr(data),
        }
    }

    /// Reads a variable at its resolved distance, or from the globals when
    /// the resolver left it unannotated.
    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> ExecResult<Object> {
        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => (-right).ok_or_else(|| RuntimeError {
                token: data.operator.clone(),
                message: "Operand must be a number.".to_string(),
            }.into()),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> ExecResult<Object> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;

        let operator = &data.operator;
        match operator.r#type {
            Type::Plus => (left + right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be two numbers or two strings.".to_string(),
            }.into()),
            Type::Minus => (left - right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers.".to_string(),
            }.into()),
            Type::Slash => (left / right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers.".to_string(),
            }.into()),
            Type::Star => (left * right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers.".to_string(),
            }.into()),
            Type::Greater => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Object::from(left > right))
            },
            Type::GreaterEqual => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Object::from(left >= right))
            },
            Type::Less => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Object::from(left < right))
            },
            Type::LessEqual => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Object::from(left <= right))
            },
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!(),
        }
    }

    /// Short-circuits and returns one of the operand values untouched,
    /// never a boolean made from it.
    fn visit_logical_expr(&mut self, data: &LogicalData) -> ExecResult<Object> {
        let left = self.evaluate(&data.left)?;

        match data.operator.r#type {
            Type::Or if left.is_truthy() => Ok(left),
            Type::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&data.right),
        }
    }

    fn visit_assign_expr(&mut self, data: &AssignData) -> ExecResult<Object> {
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.name) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &data.name, value.clone())?;
            },
            None => {
                self.globals.borrow_mut().assign(&data.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> ExecResult<Object> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => {
                return Err(RuntimeError {
                    token: data.paren.clone(),
                    message: "Can only call functions and classes.".to_string(),
                }.into());
            },
        };

        if arguments.len() != arity {
            return Err(RuntimeError {
                token: data.paren.clone(),
                message: format!("Expected {} arguments but got {}.", arity, arguments.len()),
            }.into());
        }

        let result = match &callee {
            Object::Function(function) => function.call(self, arguments),
            Object::NativeFunction(function) => function.call(self, arguments),
            Object::Class(class) => Class::construct(class, self, arguments),
            _ => unreachable!(),
        };

        result.map_err(Unwind::from)
    }

    fn visit_get_expr(&mut self, data: &GetData) -> ExecResult<Object> {
        let object = self.evaluate(&data.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&data.name, &object)?),
            _ => Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have properties.".to_string(),
            }.into()),
        }
    }

    fn visit_set_expr(&mut self, data: &SetData) -> ExecResult<Object> {
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have fields.".to_string(),
            }.into());
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());

        Ok(value)
    }

    /// Looks the method up on the superclass of the class the method
    /// lexically sits in, then binds it to the current instance. `super`
    /// lives at its resolved distance and `this` one scope closer.
    fn visit_super_expr(&mut self, data: &SuperData) -> ExecResult<Object> {
        let distance = *self.locals.get(&data.keyword)
            .expect("'super' to have been resolved");

        let superclass = self.environment.borrow().get_at(distance, &data.keyword)?;
        let instance = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        let Object::Class(superclass) = superclass else {
            unreachable!("'super' to be bound to a class");
        };

        let method = superclass.borrow().find_method(&data.method.lexeme);
        match method {
            Some(method) => Ok(Object::from(method.bind(instance))),
            None => Err(RuntimeError {
                token: data.method.clone(),
                message: format!("Undefined property '{}'.", data.method.lexeme),
            }.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    /// Runs a program through the full pipeline and returns what it printed.
    fn run(source: &str) -> String {
        let mut output = Vec::new();

        {
            let mut interpreter = Interpreter::new(&mut output);
            let tokens = Scanner::new(source).scan_tokens();
            let statements = Parser::new(tokens).parse();
            Resolver::new(&mut interpreter).resolve(&statements);
            interpreter.interpret(&statements);
        }

        String::from_utf8(output).expect("printed output to be valid UTF-8")
    }

    #[test]
    fn print_string() {
        assert_eq!(run("print \"hello\";"), "hello\n");
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run("print 10 - 4 / 2;"), "8\n");
    }

    #[test]
    fn whole_numbers_print_without_decimal_point() {
        assert_eq!(run("print 8 / 2;"), "4\n");
        assert_eq!(run("print 2.5 * 2;"), "5\n");
        assert_eq!(run("print 0.5 + 1;"), "1.5\n");
    }

    #[test]
    fn division_by_zero_is_infinite() {
        assert_eq!(run("print 1 / 0;"), "inf\n");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(run("print -(-3);"), "3\n");
        assert_eq!(run("print !true;"), "false\n");
        assert_eq!(run("print !nil;"), "true\n");
        assert_eq!(run("print !0;"), "false\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run("print \"a\" + \"b\";"), "ab\n");
    }

    #[test]
    fn equality_never_crosses_types() {
        assert_eq!(run("print 0 == \"0\";"), "false\n");
        assert_eq!(run("print nil == nil;"), "true\n");
        assert_eq!(run("print nil == false;"), "false\n");
        assert_eq!(run("print \"a\" != \"b\";"), "true\n");
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(run("print 1 < 2;"), "true\n");
        assert_eq!(run("print 2 <= 2;"), "true\n");
        assert_eq!(run("print 1 > 2;"), "false\n");
        assert_eq!(run("print 0/0 == 0/0;"), "false\n");
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(run("print nil or \"yes\";"), "yes\n");
        assert_eq!(run("print 0 or 1;"), "0\n");
        assert_eq!(run("print false and 2;"), "false\n");
        assert_eq!(run("print 1 and 2;"), "2\n");
    }

    #[test]
    fn block_scoping_shadows() {
        assert_eq!(
            run("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    #[test]
    fn if_else_branches() {
        assert_eq!(run("if (1 < 2) print \"then\"; else print \"else\";"), "then\n");
        assert_eq!(run("if (nil) print \"then\"; else print \"else\";"), "else\n");
    }

    #[test]
    fn while_loop() {
        assert_eq!(run("var i = 0; while (i < 3) { print i; i = i + 1; }"), "0\n1\n2\n");
    }

    #[test]
    fn for_loop() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");
    }

    #[test]
    fn function_declaration_and_call() {
        assert_eq!(
            run("fun add(a, b) { return a + b; } print add(1, 2);"),
            "3\n"
        );
    }

    #[test]
    fn function_without_return_yields_nil() {
        assert_eq!(run("fun noop() {} print noop();"), "nil\n");
    }

    #[test]
    fn function_prints_as_designator() {
        assert_eq!(run("fun f() {} print f;"), "<fn f>\n");
        assert_eq!(run("print clock;"), "<native fn clock>\n");
    }

    #[test]
    fn closure_counter_keeps_state() {
        let source = "\
            fun counter() {\n\
                var i = 0;\n\
                fun increment() { i = i + 1; return i; }\n\
                return increment;\n\
            }\n\
            var f = counter();\n\
            print f();\n\
            print f();";

        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn closure_sees_updates_through_shared_scope() {
        let source = "\
            var global = \"before\";\n\
            fun show() { print global; }\n\
            show();\n\
            global = \"after\";\n\
            show();";

        assert_eq!(run(source), "before\nafter\n");
    }

    #[test]
    fn resolver_pins_bindings_at_definition() {
        let source = "\
            var a = \"global\";\n\
            {\n\
                fun show() { print a; }\n\
                show();\n\
                var a = \"block\";\n\
                show();\n\
            }";

        assert_eq!(run(source), "global\nglobal\n");
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let source = "\
            var a = \"global\";\n\
            {\n\
                fun show() { print a; }\n\
                var a = \"block\";\n\
                show();\n\
            }";

        let mut output = Vec::new();
        {
            let mut interpreter = Interpreter::new(&mut output);
            let tokens = Scanner::new(source).scan_tokens();
            let statements = Parser::new(tokens).parse();
            Resolver::new(&mut interpreter).resolve(&statements);
            Resolver::new(&mut interpreter).resolve(&statements);
            interpreter.interpret(&statements);
        }

        assert_eq!(String::from_utf8(output).unwrap(), "global\n");
    }

    #[test]
    fn class_and_instance_print_as_designators() {
        assert_eq!(run("class Foo {} print Foo;"), "Foo\n");
        assert_eq!(run("class Foo {} print Foo();"), "Foo instance\n");
    }

    #[test]
    fn method_dispatch() {
        assert_eq!(
            run("class A { greet() { print \"hi\"; } } A().greet();"),
            "hi\n"
        );
    }

    #[test]
    fn fields_are_created_on_assignment() {
        assert_eq!(
            run("class Box {} var b = Box(); b.value = 7; print b.value;"),
            "7\n"
        );
    }

    #[test]
    fn initializer_binds_fields() {
        assert_eq!(
            run("class A { init(n) { this.n = n; } } print A(7).n;"),
            "7\n"
        );
    }

    #[test]
    fn initializer_returns_the_instance() {
        assert_eq!(
            run("class A { init() {} } var a = A(); print a.init() == a;"),
            "true\n"
        );
    }

    #[test]
    fn inherited_methods_and_fields() {
        let source = "\
            class A { init(n) { this.n = n; } }\n\
            class B < A { show() { print this.n; } }\n\
            B(7).show();";

        assert_eq!(run(source), "7\n");
    }

    #[test]
    fn super_calls_overridden_method() {
        let source = "\
            class A { m() { print \"A\"; } }\n\
            class B < A { m() { super.m(); print \"B\"; } }\n\
            B().m();";

        assert_eq!(run(source), "A\nB\n");
    }

    #[test]
    fn bound_methods_carry_their_instance() {
        let source = "\
            class Person {\n\
                init(name) { this.name = name; }\n\
                say() { print this.name; }\n\
            }\n\
            var m = Person(\"maria\").say;\n\
            m();";

        assert_eq!(run(source), "maria\n");
    }

    #[test]
    fn clock_is_a_number_of_seconds() {
        // Well past 2020-01-01 in epoch seconds, well before the year 3000.
        assert_eq!(run("print clock() > 1577836800;"), "true\n");
        assert_eq!(run("print clock() < 32503680000;"), "true\n");
    }
}
