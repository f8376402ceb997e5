//! Component detection: partitions variables by shared-clause
//! connectivity via union-find, the same idiom already used in
//! [`super::replace`] for equivalence classes.

use crate::cdb::ClauseDb;
use crate::types::VarId;

#[derive(Clone, Debug)]
pub struct ComponentFinder {
    parent: Vec<VarId>,
}

impl ComponentFinder {
    pub fn new(num_vars: usize) -> ComponentFinder {
        ComponentFinder {
            parent: (0..=num_vars).collect(),
        }
    }

    fn find(&mut self, x: VarId) -> VarId {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: VarId, b: VarId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }

    /// Returns the components with at least `min_size` members, each as
    /// a sorted list of original variable ids.
    pub fn partition(&mut self, cdb: &ClauseDb, min_size: usize) -> Vec<Vec<VarId>> {
        for cid in cdb.iter_ids() {
            let c = &cdb[cid];
            if c.is_removed() || c.lits.len() < 2 {
                continue;
            }
            let first = c.lits[0].vi();
            for l in &c.lits[1..] {
                self.union(first, l.vi());
            }
        }

        let mut groups: std::collections::HashMap<VarId, Vec<VarId>> = std::collections::HashMap::new();
        for vi in 1..self.parent.len() {
            let root = self.find(vi);
            groups.entry(root).or_default().push(vi);
        }
        let mut out: Vec<Vec<VarId>> = groups.into_values().filter(|g| g.len() >= min_size).collect();
        for g in out.iter_mut() {
            g.sort_unstable();
        }
        out.sort_by_key(|g| g[0]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate, Lit};

    #[test]
    fn two_disjoint_clause_groups_form_two_components() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 4,
            ..Default::default()
        };
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        cdb.new_clause(vec![Lit::from_int(1), Lit::from_int(2)], false);
        cdb.new_clause(vec![Lit::from_int(3), Lit::from_int(4)], false);
        let mut cf = ComponentFinder::new(4);
        let parts = cf.partition(&cdb, 1);
        assert_eq!(parts.len(), 2);
    }
}
