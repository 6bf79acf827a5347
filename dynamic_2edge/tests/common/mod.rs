use std::{
    collections::BTreeSet,
    sync::{LazyLock, Mutex},
};

use flexi_logger::{Logger, LoggerHandle};
use scopeguard::{OnUnwind, ScopeGuard};

#[allow(dead_code)]
pub static LOGGER: LazyLock<Mutex<LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .set_palette("196;208;3;7;8".to_owned())
            .format(|w, now, record| {
                let style = flexi_logger::style(record.level());
                write!(
                    w,
                    "{} {pref}[{}] {}{suf}",
                    now.format("%H:%M:%S"),
                    &record.level().as_str()[0..1],
                    record.args(),
                    pref = style.prefix(),
                    suf = style.suffix(),
                )
            })
            .start()
            .unwrap(),
    )
});

#[allow(dead_code)]
pub fn init_logger() {
    let _ = &*LOGGER;
}

/// Logs the structure if the test panics while it is alive.
#[allow(dead_code)]
pub fn guard<T: std::fmt::Debug>(t: T) -> ScopeGuard<T, impl FnOnce(T), OnUnwind> {
    scopeguard::guard_on_unwind(t, |t| log::error!("Crash with {t:?}"))
}

/// Multigraph answering everything by brute force.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Dumb {
    n: usize,
    /// Edges by id, None once removed.
    edges: Vec<Option<(usize, usize)>>,
}

#[allow(dead_code)]
impl Dumb {
    pub fn new(n: usize) -> Self {
        Self { n, edges: vec![] }
    }

    pub fn add_edge(&mut self, u: usize, v: usize) -> usize {
        self.edges.push(Some((u, v)));
        self.edges.len() - 1
    }

    pub fn remove_edge(&mut self, id: usize) {
        assert!(self.edges[id].take().is_some(), "edge {id} removed twice");
    }

    pub fn edge(&self, id: usize) -> Option<(usize, usize)> {
        self.edges[id]
    }

    fn adj(&self, skip: Option<usize>) -> Vec<BTreeSet<usize>> {
        let mut adj = vec![BTreeSet::new(); self.n];
        for (id, e) in self.edges.iter().enumerate() {
            if Some(id) == skip {
                continue;
            }
            if let Some((u, v)) = *e {
                adj[u].insert(v);
                adj[v].insert(u);
            }
        }
        adj
    }

    /// Component id of every vertex, ignoring edge `skip`.
    fn groups_without(&self, skip: Option<usize>) -> Vec<usize> {
        let adj = self.adj(skip);
        let mut groups = vec![0; self.n];
        let mut group_id = 0;
        for u in 0..self.n {
            if groups[u] == 0 {
                group_id += 1;
                groups[u] = group_id;
                let mut stack = vec![u];
                while let Some(u) = stack.pop() {
                    stack.extend(adj[u].iter().copied().filter(|&v| {
                        if groups[v] == 0 {
                            groups[v] = group_id;
                            true
                        } else {
                            false
                        }
                    }));
                }
            }
        }
        groups
    }

    pub fn groups(&self) -> Vec<usize> {
        self.groups_without(None)
    }

    /// Ids of the edges whose removal disconnects something.
    pub fn bridges(&self) -> BTreeSet<usize> {
        let groups = self.groups();
        let count = |gs: &[usize]| gs.iter().collect::<BTreeSet<_>>().len();
        let base = count(&groups);
        (0..self.edges.len())
            .filter(|&id| {
                self.edges[id].is_some() && count(&self.groups_without(Some(id))) > base
            })
            .collect()
    }

    /// Whether removing the edge disconnects u from v.
    pub fn separates(&self, id: usize, u: usize, v: usize) -> bool {
        let gs = self.groups_without(Some(id));
        gs[u] != gs[v]
    }

    /// For every pair, whether it is two-edge connected.
    pub fn two_edge_groups(&self) -> Vec<Vec<bool>> {
        let groups = self.groups();
        let cuts: Vec<_> = self
            .bridges()
            .into_iter()
            .map(|id| self.groups_without(Some(id)))
            .collect();
        (0..self.n)
            .map(|u| {
                (0..self.n)
                    .map(|v| groups[u] == groups[v] && cuts.iter().all(|gs| gs[u] == gs[v]))
                    .collect()
            })
            .collect()
    }
}
