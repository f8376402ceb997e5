//! Variable renumbering: derives a dense numbering over the variables
//! still `Active` after elimination/replacement, without physically
//! compacting the clause database (which would mean rewriting every
//! stored literal). The solver's one load-bearing use of this is the
//! active-variable count: completion detection compares trail length
//! against this count rather than the total variable count, since
//! eliminated/replaced variables never reach the trail.

use crate::assign::{AssignStack, RemovedState};
use crate::types::VarId;

#[derive(Clone, Debug, Default)]
pub struct Renumberer {
    inner_to_outer: Vec<VarId>,
}

impl Renumberer {
    /// Counts every variable still `Active` in `asg`, preserving the
    /// outer order.
    pub fn build(asg: &AssignStack) -> Renumberer {
        let mut inner_to_outer = Vec::new();
        for vi in 1..asg.var.len() {
            if asg.var[vi].removed == RemovedState::Active {
                inner_to_outer.push(vi);
            }
        }
        Renumberer { inner_to_outer }
    }

    pub fn num_inner(&self) -> usize {
        self.inner_to_outer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::RemovedState;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn renumbering_skips_non_active_variables() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 4,
            ..Default::default()
        };
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        asg.var[2].removed = RemovedState::Eliminated;
        let ren = Renumberer::build(&asg);
        assert_eq!(ren.num_inner(), 3);
    }
}
