//! Expectation registry.
//!
//! Maps an incoming message kind to the reactions the controller wants when
//! that kind shows up in a cycle, or fails to. The registry is a fixed array
//! indexed by [`ToProgramKind`], so lookups never allocate and at most one
//! entry exists per kind.

use boiler_common::control_unit::messages::{ToProgram, ToProgramKind, ToUnits};

use crate::deferred::PendingAction;

/// Whether an entry stays registered after reacting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    KeepListening,
    Unlisten,
}

/// Reaction when the kind did not arrive this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnMissing {
    /// Command to send again.
    pub resend: Option<ToUnits>,
    pub response: Response,
}

impl OnMissing {
    /// Do nothing and keep waiting.
    pub const KEEP_LISTENING: Self = Self {
        resend: None,
        response: Response::KeepListening,
    };

    /// Send `msg` again and keep waiting.
    pub const fn resend(msg: ToUnits) -> Self {
        Self {
            resend: Some(msg),
            response: Response::KeepListening,
        }
    }
}

/// Reaction when the kind arrived this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnPresent {
    /// Action queued behind the scan.
    pub action: Option<PendingAction>,
    pub response: Response,
}

impl OnPresent {
    /// Queue `action` and drop the entry.
    pub const fn once(action: PendingAction) -> Self {
        Self {
            action: Some(action),
            response: Response::Unlisten,
        }
    }
}

/// One registered kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub on_missing: OnMissing,
    pub on_present: OnPresent,
}

/// Outcome of matching one cycle's messages against the registry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scan {
    /// Actions of entries whose kind arrived, in arrival order.
    pub present: Vec<PendingAction>,
    /// Commands of entries whose kind did not arrive, in kind order.
    pub resend: Vec<ToUnits>,
    /// Registered kinds that arrived more than once.
    pub duplicates: Vec<ToProgramKind>,
    /// Messages no entry was waiting for, in arrival order.
    pub unmatched: Vec<ToProgram>,
}

/// Awaited incoming kinds and their reactions.
#[derive(Debug, Clone)]
pub struct ExpectationRegistry {
    entries: [Option<Expectation>; ToProgramKind::COUNT],
}

impl Default for ExpectationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpectationRegistry {
    pub const fn new() -> Self {
        Self {
            entries: [None; ToProgramKind::COUNT],
        }
    }

    /// Register `kind`, replacing any previous entry.
    #[inline]
    pub fn register(&mut self, kind: ToProgramKind, expectation: Expectation) {
        self.entries[kind.index()] = Some(expectation);
    }

    /// Start a registration for `kind`.
    pub fn expect(&mut self, kind: ToProgramKind) -> Expect<'_> {
        Expect {
            registry: self,
            kind,
        }
    }

    #[inline]
    pub fn get(&self, kind: ToProgramKind) -> Option<&Expectation> {
        self.entries[kind.index()].as_ref()
    }

    #[inline]
    pub fn contains(&self, kind: ToProgramKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Drop the entry for `kind`, if any.
    pub fn remove(&mut self, kind: ToProgramKind) -> Option<Expectation> {
        self.entries[kind.index()].take()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries = [None; ToProgramKind::COUNT];
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Registered kinds in index order.
    pub fn kinds(&self) -> impl Iterator<Item = ToProgramKind> + '_ {
        ToProgramKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
    }

    /// Match one cycle's messages against the registry.
    ///
    /// Each registered kind consumes the first message of that kind; later
    /// ones are reported as duplicates. Kinds that received nothing fire
    /// their on-missing reaction. Entries answering [`Response::Unlisten`]
    /// are removed only after the whole scan.
    pub fn dispatch(&mut self, incoming: &[ToProgram]) -> Scan {
        let mut scan = Scan::default();
        let mut seen = [false; ToProgramKind::COUNT];
        let mut unlisten = [false; ToProgramKind::COUNT];

        for msg in incoming {
            let kind = msg.kind();
            let idx = kind.index();
            let Some(entry) = self.entries[idx] else {
                scan.unmatched.push(*msg);
                continue;
            };
            if seen[idx] {
                if !scan.duplicates.contains(&kind) {
                    scan.duplicates.push(kind);
                }
                continue;
            }
            seen[idx] = true;
            if let Some(action) = entry.on_present.action {
                scan.present.push(action);
            }
            unlisten[idx] = entry.on_present.response == Response::Unlisten;
        }

        for (idx, slot) in self.entries.iter().enumerate() {
            let Some(entry) = slot else { continue };
            if seen[idx] {
                continue;
            }
            if let Some(msg) = entry.on_missing.resend {
                scan.resend.push(msg);
            }
            unlisten[idx] = entry.on_missing.response == Response::Unlisten;
        }

        for (slot, drop) in self.entries.iter_mut().zip(unlisten) {
            if drop {
                *slot = None;
            }
        }
        scan
    }
}

/// Registration builder returned by [`ExpectationRegistry::expect`].
#[must_use = "an expectation is only registered by `eventually` or `always`"]
pub struct Expect<'a> {
    registry: &'a mut ExpectationRegistry,
    kind: ToProgramKind,
}

impl Expect<'_> {
    /// Wait as long as it takes, run `action` once the kind arrives.
    pub fn eventually(self, action: PendingAction) {
        self.always(OnMissing::KEEP_LISTENING, OnPresent::once(action));
    }

    /// Register an arbitrary reaction pair.
    pub fn always(self, on_missing: OnMissing, on_present: OnPresent) {
        self.registry.register(
            self.kind,
            Expectation {
                on_missing,
                on_present,
            },
        );
    }
}
