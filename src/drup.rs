//! DRUP proof emission: a line-oriented, space-separated format
//! terminated by `0`, with `d `-prefixed deletion lines. "Delayed"
//! deletions buffer the old clause text and only commit once its
//! replacement has been added, so a checker never sees a clause deleted
//! before the shortened version that subsumes it is added.

use crate::types::Lit;
use std::io::{self, Write};

pub struct Proof {
    sink: Option<Box<dyn Write + Send>>,
    delayed: Vec<Vec<Lit>>,
}

impl Proof {
    pub fn disabled() -> Proof {
        Proof {
            sink: None,
            delayed: Vec::new(),
        }
    }

    pub fn to_writer<W: Write + Send + 'static>(w: W) -> Proof {
        Proof {
            sink: Some(Box::new(w)),
            delayed: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    fn write_line(&mut self, prefix: &str, lits: &[Lit]) {
        if let Some(w) = self.sink.as_mut() {
            let mut line = String::from(prefix);
            for l in lits {
                line.push_str(&l.to_int().to_string());
                line.push(' ');
            }
            line.push_str("0\n");
            let _ = w.write_all(line.as_bytes());
        }
    }

    pub fn add(&mut self, lits: &[Lit]) {
        self.write_line("", lits);
    }

    pub fn delete(&mut self, lits: &[Lit]) {
        self.write_line("d ", lits);
    }

    /// Buffers a deletion to be committed only once its replacement has
    /// been added via [`Proof::commit_delayed`].
    pub fn delay_delete(&mut self, lits: Vec<Lit>) {
        self.delayed.push(lits);
    }

    pub fn commit_delayed(&mut self) {
        let pending = std::mem::take(&mut self.delayed);
        for lits in pending {
            self.delete(&lits);
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(w) = self.sink.as_mut() {
            w.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_proof_writes_nothing() {
        let mut p = Proof::disabled();
        p.add(&[Lit::from_int(1), Lit::from_int(-2)]);
        assert!(!p.is_enabled());
    }

    #[test]
    fn delayed_deletion_commits_on_request() {
        let buf: Vec<u8> = Vec::new();
        let mut p = Proof::to_writer(buf);
        p.delay_delete(vec![Lit::from_int(1)]);
        assert_eq!(p.delayed.len(), 1);
        p.commit_delayed();
        assert_eq!(p.delayed.len(), 0);
    }
}
