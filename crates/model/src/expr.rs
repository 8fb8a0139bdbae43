//! Typed expressions
//!
//! An [`Expr`] wraps one IR node and tags it with the model it is evaluated
//! against and the host type it produces. The tags only constrain which
//! builders can be combined; the wrapped IR is identical to what an untyped
//! caller would build by hand.
//!
//! Compilation failures are carried inside the expression and surface when
//! the enclosing query or mutation is compiled.

use crate::entity::Model;
use crate::error::{CompileError, Result};
use crate::path::KeyPath;
use crate::query::SortDescriptor;
use chrono::{DateTime, Utc};
use persist_sql::{BinaryOperator, Expression, Function, Ordering, UnaryOperator};
use persist_value::Field;
use std::fmt;
use std::marker::PhantomData;

pub struct Expr<M, V> {
    inner: Result<Expression>,
    marker: PhantomData<fn(&M) -> V>,
}

/// A boolean expression over rows of `M`.
pub type Predicate<M> = Expr<M, bool>;

/// Anything that can stand in for an expression of `V` over `M`: another
/// expression, a key path, or a literal.
pub trait IntoExpr<M, V> {
    fn into_expr(self) -> Expr<M, V>;
}

impl<M, V> IntoExpr<M, V> for Expr<M, V> {
    fn into_expr(self) -> Expr<M, V> {
        self
    }
}

impl<M: Model, V> IntoExpr<M, V> for KeyPath<M, V> {
    fn into_expr(self) -> Expr<M, V> {
        Expr::from_result(self.compile())
    }
}

impl<M, V: Field> IntoExpr<M, V> for V {
    fn into_expr(self) -> Expr<M, V> {
        Expr::literal(self)
    }
}

impl<M, V: Field> IntoExpr<M, Option<V>> for V {
    fn into_expr(self) -> Expr<M, Option<V>> {
        Expr::from_expression(Expression::Value(self.into_value()))
    }
}

impl<M> IntoExpr<M, String> for &str {
    fn into_expr(self) -> Expr<M, String> {
        Expr::literal(self.to_string())
    }
}

/// Host types that support arithmetic.
pub trait Numeric: Field {}

impl Numeric for i64 {}
impl Numeric for i32 {}
impl Numeric for f64 {}
impl<T: Numeric> Numeric for Option<T> {}

impl<M, V> Expr<M, V> {
    pub(crate) fn from_result(inner: Result<Expression>) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }

    /// Wraps an untyped IR node. The caller vouches for the tags.
    pub fn from_expression(expression: Expression) -> Self {
        Self::from_result(Ok(expression))
    }

    /// The wrapped IR node, or the first error met while building it.
    pub fn compile(&self) -> Result<Expression> {
        self.inner.clone()
    }

    pub(crate) fn into_result(self) -> Result<Expression> {
        self.inner
    }

    fn unary<W>(self, op: UnaryOperator) -> Expr<M, W> {
        Expr::from_result(self.inner.map(|e| Expression::unary(op, e)))
    }

    fn binary<U, W>(self, op: BinaryOperator, other: Expr<M, U>) -> Expr<M, W> {
        Expr::from_result(
            self.inner
                .and_then(|lhs| Ok(Expression::binary(op, lhs, other.inner?))),
        )
    }

    fn compare(self, op: BinaryOperator, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.binary(op, other.into_expr())
    }

    pub fn eq(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::Equal, other)
    }

    pub fn ne(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::NotEqual, other)
    }

    pub fn lt(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::Less, other)
    }

    pub fn gt(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::Greater, other)
    }

    pub fn le(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::LessOrEqual, other)
    }

    pub fn ge(self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.compare(BinaryOperator::GreaterOrEqual, other)
    }

    pub fn is_null(self) -> Predicate<M> {
        self.unary(UnaryOperator::IsNull)
    }

    pub fn is_not_null(self) -> Predicate<M> {
        self.unary(UnaryOperator::IsNotNull)
    }

    /// True when the expression equals any of `values`. An empty list
    /// matches nothing.
    pub fn is_in<I>(self, values: I) -> Predicate<M>
    where
        I: IntoIterator,
        I::Item: IntoExpr<M, V>,
    {
        let inner = self.inner.and_then(|lhs| {
            let mut chain: Option<Expression> = None;
            for value in values {
                let test = lhs.clone().equals(value.into_expr().inner?);
                chain = Some(match chain {
                    Some(chain) => chain.or(test),
                    None => test,
                });
            }
            Ok(chain.unwrap_or_else(|| Expression::value(false as i64)))
        });
        Expr::from_result(inner)
    }

    pub fn ascending(self) -> SortDescriptor<M> {
        SortDescriptor::new(self.inner.map(Ordering::ascending))
    }

    pub fn descending(self) -> SortDescriptor<M> {
        SortDescriptor::new(self.inner.map(Ordering::descending))
    }
}

impl<M, V: Field> Expr<M, V> {
    pub fn literal(value: V) -> Self {
        Self::from_expression(Expression::Value(value.into_value()))
    }
}

#[allow(clippy::should_implement_trait)]
impl<M, V: Numeric> Expr<M, V> {
    pub fn add(self, other: impl IntoExpr<M, V>) -> Self {
        self.binary(BinaryOperator::Add, other.into_expr())
    }

    pub fn sub(self, other: impl IntoExpr<M, V>) -> Self {
        self.binary(BinaryOperator::Subtract, other.into_expr())
    }

    pub fn mul(self, other: impl IntoExpr<M, V>) -> Self {
        self.binary(BinaryOperator::Multiply, other.into_expr())
    }

    pub fn div(self, other: impl IntoExpr<M, V>) -> Self {
        self.binary(BinaryOperator::Divide, other.into_expr())
    }

    pub fn neg(self) -> Self {
        self.unary(UnaryOperator::Negate)
    }
}

impl<M> Expr<M, String> {
    pub fn concat(self, other: impl IntoExpr<M, String>) -> Self {
        self.binary(BinaryOperator::Concatenate, other.into_expr())
    }

    /// Length in characters.
    pub fn length(self) -> Expr<M, i64> {
        Expr::from_result(
            self.inner
                .map(|e| Expression::function(Function::Length, vec![e])),
        )
    }
}

impl<M, V: Field> Expr<M, Option<V>> {
    /// The expression, or `fallback` where it is null.
    pub fn coalesce(self, fallback: impl IntoExpr<M, V>) -> Expr<M, V> {
        let fallback = fallback.into_expr();
        Expr::from_result(self.inner.and_then(|e| {
            Ok(Expression::function(
                Function::Coalesce,
                vec![e, fallback.inner?],
            ))
        }))
    }
}

impl<M> Predicate<M> {
    pub fn and(self, other: impl IntoExpr<M, bool>) -> Self {
        self.binary(BinaryOperator::And, other.into_expr())
    }

    pub fn or(self, other: impl IntoExpr<M, bool>) -> Self {
        self.binary(BinaryOperator::Or, other.into_expr())
    }
}

impl<M> std::ops::Not for Predicate<M> {
    type Output = Self;

    fn not(self) -> Self {
        self.unary(UnaryOperator::Not)
    }
}

fn variadic<M, V>(function: Function, args: Vec<Expr<M, V>>) -> Expr<M, V> {
    if args.len() < 2 {
        return Expr::from_result(Err(CompileError::TooFewArguments {
            function: function.name(),
            min: 2,
            got: args.len(),
        }));
    }
    let args: Result<Vec<_>> = args.into_iter().map(Expr::into_result).collect();
    Expr::from_result(args.map(|args| Expression::function(function, args)))
}

/// Greatest of two or more expressions.
pub fn max<M, V>(args: impl IntoIterator<Item = Expr<M, V>>) -> Expr<M, V> {
    variadic(Function::Max, args.into_iter().collect())
}

/// Least of two or more expressions.
pub fn min<M, V>(args: impl IntoIterator<Item = Expr<M, V>>) -> Expr<M, V> {
    variadic(Function::Min, args.into_iter().collect())
}

/// The moment the statement is evaluated by the engine.
pub fn now<M>() -> Expr<M, DateTime<Utc>> {
    Expr::from_expression(Expression::now())
}

impl<M, V> Clone for Expr<M, V> {
    fn clone(&self) -> Self {
        Self::from_result(self.inner.clone())
    }
}

impl<M, V> fmt::Debug for Expr<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Ok(expression) => write!(f, "Expr({})", expression),
            Err(e) => write!(f, "Expr(<{}>)", e),
        }
    }
}

impl<M: Model, V> KeyPath<M, V> {
    pub fn expr(&self) -> Expr<M, V> {
        self.clone().into_expr()
    }

    pub fn eq(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().eq(other)
    }

    pub fn ne(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().ne(other)
    }

    pub fn lt(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().lt(other)
    }

    pub fn gt(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().gt(other)
    }

    pub fn le(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().le(other)
    }

    pub fn ge(&self, other: impl IntoExpr<M, V>) -> Predicate<M> {
        self.expr().ge(other)
    }

    pub fn is_null(&self) -> Predicate<M> {
        self.expr().is_null()
    }

    pub fn is_not_null(&self) -> Predicate<M> {
        self.expr().is_not_null()
    }

    pub fn is_in<I>(&self, values: I) -> Predicate<M>
    where
        I: IntoIterator,
        I::Item: IntoExpr<M, V>,
    {
        self.expr().is_in(values)
    }

    pub fn ascending(&self) -> SortDescriptor<M> {
        self.expr().ascending()
    }

    pub fn descending(&self) -> SortDescriptor<M> {
        self.expr().descending()
    }
}

impl<M: Model, T: Model> KeyPath<M, T> {
    /// Compares a to-one relationship with the identifier of a related row.
    pub fn is(&self, id: T::Id) -> Predicate<M> {
        let id = Expression::Value(id.into_value());
        Expr::from_result(self.compile().map(|path| path.equals(id)))
    }
}
