//! Round-based expansion of the three colour channels and the mask.
//!
//! Expansion works on a flat arena of draft nodes. Every round first collects
//! the open holes, then resolves them in textual order. A hole becomes a
//! function call with probability that shrinks as the round number grows, and
//! the final round can only produce values, so the sealed tree never contains
//! a hole.

use crate::catalog::Catalog;
use crate::rng::ShaderRng;

/// Index into the value table of the catalog that built the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRef(pub usize);

/// Index into the function table of the catalog that built the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(pub usize);

/// Index into the mask table of the catalog that built the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskRef(pub usize);

/// A fully resolved expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Value(ValueRef),
    Call { function: FunctionRef, args: Vec<Expr> },
}

impl Expr {
    /// Deepest nesting of function applications below and including `self`.
    pub fn call_depth(&self) -> u32 {
        match self {
            Expr::Value(_) => 0,
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::call_depth).max().unwrap_or(0),
        }
    }

    /// Number of template instances (values and calls) in this expression.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Value(_) => 1,
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }
}

/// The generated colour program before serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderTree {
    pub max_depth: u32,
    pub animate: bool,
    pub mask: MaskRef,
    pub mask_args: Vec<Expr>,
    /// Red, green and blue, in that order.
    pub channels: [Expr; 3],
}

impl ShaderTree {
    /// Expands a tree with `max_depth + 1` rounds.
    ///
    /// Consumes one draw for the mask, then per resolved hole one draw for the
    /// depth test and one for the weighted pick.
    pub fn expand(catalog: &Catalog, animate: bool, max_depth: u32, rng: &mut ShaderRng) -> Self {
        let mask = catalog.masks().pick(rng);
        let mask_arity = catalog
            .masks()
            .get(mask)
            .map(|entry| entry.template.arity())
            .unwrap_or(0);

        let mut arena = Arena::default();
        let channels = [arena.hole(), arena.hole(), arena.hole()];
        let mask_args: Vec<NodeId> = (0..mask_arity).map(|_| arena.hole()).collect();

        let mut pending: Vec<NodeId> = channels.iter().chain(&mask_args).copied().collect();
        let values = catalog.values(animate);
        let functions = catalog.functions();
        let ceiling = max_depth.saturating_mul(max_depth).max(1);

        for round in 0..=max_depth {
            let threshold = round.saturating_mul(round);
            let current = std::mem::take(&mut pending);
            for hole in current {
                let draw = rng.int_between(1, ceiling);
                if round < max_depth && draw > threshold {
                    let function = functions.pick(rng);
                    let arity = functions
                        .get(function)
                        .map(|entry| entry.template.arity())
                        .unwrap_or(0);
                    let args: Vec<NodeId> = (0..arity).map(|_| arena.hole()).collect();
                    pending.extend(&args);
                    arena.fill(hole, Draft::Call { function, args });
                } else {
                    arena.fill(hole, Draft::Value(values.pick(rng)));
                }
            }
            if pending.is_empty() {
                break;
            }
        }

        let [red, green, blue] = channels;
        Self {
            max_depth,
            animate,
            mask: MaskRef(mask),
            mask_args: mask_args.into_iter().map(|id| arena.seal(id)).collect(),
            channels: [arena.seal(red), arena.seal(green), arena.seal(blue)],
        }
    }

    /// Deepest call nesting across the channels and the mask arguments.
    pub fn call_depth(&self) -> u32 {
        self.expressions().map(Expr::call_depth).max().unwrap_or(0)
    }

    /// Template instances in the tree, the mask included.
    pub fn node_count(&self) -> usize {
        1 + self.expressions().map(Expr::node_count).sum::<usize>()
    }

    /// Channels then mask arguments, which is also their textual order.
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.channels.iter().chain(&self.mask_args)
    }
}

type NodeId = usize;

#[derive(Debug)]
enum Draft {
    Hole,
    Value(usize),
    Call { function: usize, args: Vec<NodeId> },
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Draft>,
}

impl Arena {
    fn hole(&mut self) -> NodeId {
        self.nodes.push(Draft::Hole);
        self.nodes.len() - 1
    }

    fn fill(&mut self, id: NodeId, draft: Draft) {
        self.nodes[id] = draft;
    }

    fn seal(&self, id: NodeId) -> Expr {
        match &self.nodes[id] {
            Draft::Value(value) => Expr::Value(ValueRef(*value)),
            Draft::Call { function, args } => Expr::Call {
                function: FunctionRef(*function),
                args: args.iter().map(|arg| self.seal(*arg)).collect(),
            },
            // The final round always resolves to values.
            Draft::Hole => unreachable!("hole left after the final expansion round"),
        }
    }
}
