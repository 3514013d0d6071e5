//! Backtracking engine: every reachable end offset.
//!
//! Where the greedy walker returns one consumption per element, this engine
//! returns the set of all offsets at which an element can end when started at
//! a given offset. A sequence threads every end of one child into the next, so
//! no split is missed.
//!
//! Results for rule references are memoized per (rule, offset) within one
//! run, which keeps nested ambiguous rules polynomial.

use crate::engine::{resolve, Frames};
use crate::{Element, Grammar, MatchError, Repetition};
use std::collections::{BTreeSet, HashMap};

pub(crate) type Ends = BTreeSet<usize>;

/// One backtracking match run.
pub(crate) struct Backtracker<'g> {
    grammar: Option<&'g Grammar>,
    frames: Frames,
    memo: HashMap<(usize, usize), Ends>,
}

impl<'g> Backtracker<'g> {
    pub(crate) fn new(grammar: Option<&'g Grammar>) -> Self {
        Self {
            grammar,
            frames: Frames::default(),
            memo: HashMap::new(),
        }
    }

    /// All offsets at which `element` can end when started at `offset`.
    pub(crate) fn ends(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<Ends, MatchError> {
        self.frames.descend(element)?;
        let ends = self.variant_ends(element, input, offset);
        self.frames.ascend(element);
        ends
    }

    fn variant_ends(
        &mut self,
        element: &Element,
        input: &[u8],
        offset: usize,
    ) -> Result<Ends, MatchError> {
        match element {
            Element::Terminal(t) => Ok(t.match_at(input, offset).map(|n| offset + n).into_iter().collect()),
            Element::RuleRef(name) => {
                let (index, rule) = resolve(self.grammar, name)?;
                if let Some(ends) = self.memo.get(&(index, offset)) {
                    return Ok(ends.clone());
                }
                self.frames.enter(index, offset, rule.name())?;
                let ends = self.ends(rule.element(), input, offset);
                self.frames.exit();
                let ends = ends?;
                self.memo.insert((index, offset), ends.clone());
                Ok(ends)
            }
            Element::Sequence(elements) => {
                let mut current = Ends::from([offset]);
                for e in elements {
                    current = self.step(e, input, &current)?;
                    if current.is_empty() {
                        break;
                    }
                }
                Ok(current)
            }
            Element::Alternation(elements) => {
                let mut ends = Ends::new();
                for e in elements {
                    ends.extend(self.ends(e, input, offset)?);
                }
                Ok(ends)
            }
            Element::Optional(e) => {
                let mut ends = self.ends(e, input, offset)?;
                ends.insert(offset);
                Ok(ends)
            }
            Element::Repetition(r) => self.repetition_ends(r, input, offset),
        }
    }

    /// Advance every offset in `from` through `element`.
    fn step(&mut self, element: &Element, input: &[u8], from: &Ends) -> Result<Ends, MatchError> {
        let mut next = Ends::new();
        for &p in from {
            next.extend(self.ends(element, input, p)?);
        }
        Ok(next)
    }

    fn repetition_ends(
        &mut self,
        repetition: &Repetition,
        input: &[u8],
        offset: usize,
    ) -> Result<Ends, MatchError> {
        let bounds = repetition.bounds();
        let mut result = Ends::new();
        if bounds.is_satisfied(0) {
            result.insert(offset);
        }
        let mut frontier = Ends::from([offset]);
        let mut count = 0;
        while bounds.allows_more(count) && !frontier.is_empty() {
            let next = self.step(repetition.element(), input, &frontier)?;
            count += 1;
            if bounds.is_satisfied(count) {
                // An offset already in the result was expanded when it was added.
                let fresh: Ends = next.difference(&result).copied().collect();
                result.extend(fresh.iter().copied());
                frontier = fresh;
            } else if next == frontier {
                // Fixed point below the minimum: every further iteration only
                // revisits these offsets, so the minimum is reachable here.
                count = bounds.min();
                result.extend(next.iter().copied());
                frontier = next;
            } else {
                frontier = next;
            }
        }
        Ok(result)
    }
}
