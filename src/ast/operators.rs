/// Built-in operators.
///
/// Arithmetic and bitwise operators are variadic and left-fold over their
/// arguments; comparisons and `is` are binary; `not` and `truth` unary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// True division (`/`)
    Divide,

    // Bitwise
    /// Bitwise or logical AND (`&`)
    BitAnd,
    /// Bitwise or logical OR (`|`)
    BitOr,

    // Comparison
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Greater than (`>`)
    GreaterThan,

    // Logical
    /// Logical negation (`not`)
    Not,
    /// Truthiness coercion (`truth`)
    Truth,
    /// Identity comparison (`is`)
    Is,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::BitAnd,
        Operator::BitOr,
        Operator::LessThan,
        Operator::LessEqual,
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterEqual,
        Operator::GreaterThan,
        Operator::Not,
        Operator::Truth,
        Operator::Is,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterEqual => ">=",
            Operator::GreaterThan => ">",
            Operator::Not => "not",
            Operator::Truth => "truth",
            Operator::Is => "is",
        }
    }

    /// Word operators are lexed as symbols and recognised by the parser
    pub fn from_word(word: &str) -> Option<Operator> {
        match word {
            "not" => Some(Operator::Not),
            "truth" => Some(Operator::Truth),
            "is" => Some(Operator::Is),
            _ => None,
        }
    }

    pub fn is_variadic(self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::BitAnd
                | Operator::BitOr
        )
    }
}

/// Functions whose first argument is itself a function or operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HigherOrder {
    /// `(map f xs ys ...)` applies `f` elementwise across the sequences
    Map,
    /// `(partial f a ...)` binds leading arguments
    Partial,
    /// `(reduce f xs [initial])` left-folds `f` over `xs`
    Reduce,
    /// `(attrgetter 'name' ...)` builds an attribute accessor
    AttrGetter,
    /// `(methodcaller 'name' args ...)` builds a method invoker
    MethodCaller,
    /// `(itemgetter key ...)` builds an item accessor
    ItemGetter,
}

impl HigherOrder {
    pub const ALL: [HigherOrder; 6] = [
        HigherOrder::Map,
        HigherOrder::Partial,
        HigherOrder::Reduce,
        HigherOrder::AttrGetter,
        HigherOrder::MethodCaller,
        HigherOrder::ItemGetter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HigherOrder::Map => "map",
            HigherOrder::Partial => "partial",
            HigherOrder::Reduce => "reduce",
            HigherOrder::AttrGetter => "attrgetter",
            HigherOrder::MethodCaller => "methodcaller",
            HigherOrder::ItemGetter => "itemgetter",
        }
    }

    pub fn from_name(name: &str) -> Option<HigherOrder> {
        HigherOrder::ALL.into_iter().find(|h| h.name() == name)
    }
}
