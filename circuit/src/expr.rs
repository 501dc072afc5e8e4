//! Polynomial expressions over GF(2).

use std::fmt;
use std::ops::{Add, Mul};

#[derive(Clone, PartialEq, Eq)]
pub enum Expr {
    Constant(bool),
    Variable(usize),
    /// n-ary sum; the empty sum is zero.
    Sum(Vec<Expr>),
    /// n-ary product; the empty product is one.
    Product(Vec<Expr>),
}

impl Expr {
    #[inline]
    pub fn var(index: usize) -> Self {
        Expr::Variable(index)
    }

    #[inline]
    pub fn constant(value: bool) -> Self {
        Expr::Constant(value)
    }

    /// The largest variable index occurring in the expression.
    pub fn max_variable(&self) -> Option<usize> {
        match self {
            Expr::Constant(_) => None,
            Expr::Variable(i) => Some(*i),
            Expr::Sum(terms) | Expr::Product(terms) => {
                terms.iter().filter_map(Expr::max_variable).max()
            }
        }
    }

    /// Formal partial derivative with respect to variable `index`.
    pub fn partial_derivative(&self, index: usize) -> Expr {
        match self {
            Expr::Constant(_) => Expr::Constant(false),
            Expr::Variable(i) => Expr::Constant(*i == index),
            Expr::Sum(terms) => Expr::Sum(terms.iter().map(|t| t.partial_derivative(index)).collect()),
            // Product rule: one summand per factor, differentiating that factor.
            Expr::Product(factors) => Expr::Sum(
                (0..factors.len())
                    .map(|i| {
                        let mut factors = factors.clone();
                        factors[i] = factors[i].partial_derivative(index);
                        Expr::Product(factors)
                    })
                    .collect(),
            ),
        }
    }

    /// The value of the expression if it does not depend on any variable.
    ///
    /// Variables are treated as unknown, except that a product with a zero
    /// factor is zero.
    pub fn as_constant(&self) -> Option<bool> {
        match self {
            Expr::Constant(c) => Some(*c),
            Expr::Variable(_) => None,
            Expr::Sum(terms) => terms
                .iter()
                .try_fold(false, |acc, t| t.as_constant().map(|v| acc ^ v)),
            Expr::Product(factors) => {
                let mut acc = Some(true);
                for factor in factors {
                    acc = match (acc, factor.as_constant()) {
                        (Some(false), _) | (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    };
                }
                acc
            }
        }
    }

    /// Replace variable `index` by the constant `value`.
    pub fn substitute(&self, index: usize, value: bool) -> Expr {
        match self {
            Expr::Variable(i) if *i == index => Expr::Constant(value),
            Expr::Constant(_) | Expr::Variable(_) => self.clone(),
            Expr::Sum(terms) => Expr::Sum(terms.iter().map(|t| t.substitute(index, value)).collect()),
            Expr::Product(factors) => {
                Expr::Product(factors.iter().map(|t| t.substitute(index, value)).collect())
            }
        }
    }

    /// Evaluate under `assignment`.
    ///
    /// # Panics
    ///
    /// Panics if a variable index is out of range of `assignment`.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        match self {
            Expr::Constant(c) => *c,
            Expr::Variable(i) => assignment[*i],
            Expr::Sum(terms) => terms.iter().fold(false, |acc, t| acc ^ t.evaluate(assignment)),
            Expr::Product(factors) => factors.iter().all(|t| t.evaluate(assignment)),
        }
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        match self {
            Expr::Sum(mut terms) => {
                terms.push(rhs);
                Expr::Sum(terms)
            }
            lhs => Expr::Sum(vec![lhs, rhs]),
        }
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        match self {
            Expr::Product(mut factors) => {
                factors.push(rhs);
                Expr::Product(factors)
            }
            lhs => Expr::Product(vec![lhs, rhs]),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, terms: &[Expr], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, t) in terms.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{:?}", t)?;
            }
            write!(f, ")")
        }
        match self {
            Expr::Constant(c) => write!(f, "{}", *c as u8),
            Expr::Variable(i) => write!(f, "x{}", i),
            Expr::Sum(terms) => join(f, terms, " + "),
            Expr::Product(factors) => join(f, factors, " * "),
        }
    }
}
