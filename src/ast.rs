use crate::expr::Expr;
use crate::literal::Literal;
use crate::stmt::Stmt;

/// Returns a string representation of the expression in parentheses.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$self.print($x);
            )*
            string += ")";

            string
        }
    };
}

/// Renders the syntax tree in parenthesized prefix form, mostly for tests
/// and debugging. `1 + 2 * 3` comes out as `(+ 1 (* 2 3))`.
pub struct ASTPrinter;

impl ASTPrinter {
    /// Prints an expression.
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            // String literals print quoted so that distinct trees render
            // distinctly; everything else uses its display form.
            Expr::Literal(Literal::String(string)) => format!("\"{string}\""),
            Expr::Literal(literal) => literal.to_string(),
            Expr::Unary(data) => parenthesize!(self, &data.operator.lexeme, &data.expr),
            Expr::Binary(data) => parenthesize!(self, &data.operator.lexeme, &data.left, &data.right),
            Expr::Logical(data) => parenthesize!(self, &data.operator.lexeme, &data.left, &data.right),
            Expr::Grouping(data) => parenthesize!(self, "group", &data.expr),
            Expr::Variable(data) => data.name.lexeme.clone(),
            Expr::Assign(data) => {
                parenthesize!(self, format!("= {}", &data.name.lexeme).as_str(), &data.value)
            },
            Expr::Call(data) => {
                let mut string = String::new();
                string += &self.print(&data.callee);
                string += "(";
                for argument in &data.arguments {
                    string += &self.print(argument);
                    string += " ";
                }
                string = string.trim_end().to_string();
                string += ")";
                string
            },
            Expr::Get(data) => {
                format!("(get {} {})", self.print(&data.object), data.name.lexeme)
            },
            Expr::Set(data) => {
                format!(
                    "(set {} {} {})",
                    self.print(&data.object),
                    data.name.lexeme,
                    self.print(&data.value)
                )
            },
            Expr::This(_) => String::from("this"),
            Expr::Super(data) => format!("(super {})", data.method.lexeme),
        }
    }

    /// Prints a statement.
    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(data) => parenthesize!(self, "expr", &data.expr),
            Stmt::Print(data) => parenthesize!(self, "print", &data.expr),
            Stmt::Var(data) => {
                let mut string = String::new();
                string += "(var ";
                string += &data.name.lexeme;
                if let Some(initializer) = &data.initializer {
                    string += " = ";
                    string += &self.print(initializer);
                }
                string += ")";

                string
            },
            Stmt::Block(data) => {
                let mut string = String::new();
                string += "{";
                for statement in &data.statements {
                    string += " ";
                    string += &self.print_stmt(statement);
                }
                string += " }";

                string
            },
            Stmt::If(data) => {
                let mut string = String::new();
                string += "(if ";
                string += &self.print(&data.condition);
                string += " ";
                string += &self.print_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    string += " else ";
                    string += &self.print_stmt(else_branch);
                }
                string += ")";

                string
            },
            Stmt::While(data) => {
                format!(
                    "(while {} {})",
                    self.print(&data.condition),
                    self.print_stmt(&data.body)
                )
            },
            Stmt::Function(data) => {
                let mut string = String::new();
                string += "(fun ";
                string += &data.name.lexeme;
                string += "(";
                for param in &data.params {
                    string += &param.lexeme;
                    string += " ";
                }
                string = string.trim_end().to_string();
                string += ") ";
                string += &self.print_stmt(&Stmt::Block(crate::stmt::BlockData {
                    statements: data.body.clone(),
                }));
                string += ")";

                string
            },
            Stmt::Return(data) => {
                match &data.value {
                    Some(value) => parenthesize!(self, "return", value),
                    None => String::from("(return)"),
                }
            },
            Stmt::Class(data) => {
                let mut string = String::new();
                string += "(class ";
                string += &data.name.lexeme;
                if let Some(superclass) = &data.superclass {
                    string += " < ";
                    string += &self.print(superclass);
                }
                for method in &data.methods {
                    string += " ";
                    string += &self.print_stmt(method);
                }
                string += ")";

                string
            },
        }
    }
}
