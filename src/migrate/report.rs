//! Per-unit outcomes of a migration run

use std::fmt;

use log::{error, info, warn};

/// Stage of the run a unit of work belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Member,
    Team,
    TeamMember,
    Repository,
    Collaborator,
    RosterUser,
    SshKey,
}

impl Phase {
    /// Every phase in run order
    pub const ALL: [Phase; 7] = [
        Phase::Member,
        Phase::Team,
        Phase::TeamMember,
        Phase::Repository,
        Phase::Collaborator,
        Phase::RosterUser,
        Phase::SshKey,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Member => "member",
            Phase::Team => "team",
            Phase::TeamMember => "team-member",
            Phase::Repository => "repository",
            Phase::Collaborator => "collaborator",
            Phase::RosterUser => "roster-user",
            Phase::SshKey => "ssh-key",
        };
        f.write_str(s)
    }
}

/// Result of one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Succeeded,
    Skipped(String),
    Failed(String),
}

impl UnitOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_))
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOutcome::Succeeded => f.write_str("succeeded"),
            UnitOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            UnitOutcome::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// A recorded unit: what was attempted and how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub phase: Phase,
    /// Entity the unit acted on, e.g. `api` or `api/alice`
    pub subject: String,
    pub outcome: UnitOutcome,
}

/// Outcome counts for one phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PhaseSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// SSH key upload counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyTally {
    pub total: usize,
    pub added: usize,
    pub existing: usize,
    pub failed: usize,
}

/// Everything recorded during a run, in the order it happened
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    records: Vec<UnitRecord>,
    key_tallies: Vec<(String, KeyTally)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a unit outcome and log it.
    pub fn record(&mut self, phase: Phase, subject: impl Into<String>, outcome: UnitOutcome) {
        let subject = subject.into();
        match &outcome {
            UnitOutcome::Succeeded => info!("phase={} unit={} outcome=succeeded", phase, subject),
            UnitOutcome::Skipped(reason) => {
                info!("phase={} unit={} outcome=skipped reason={}", phase, subject, reason)
            }
            UnitOutcome::Failed(reason) => {
                error!("phase={} unit={} outcome=failed reason={}", phase, subject, reason)
            }
        }
        self.records.push(UnitRecord {
            phase,
            subject,
            outcome,
        });
    }

    pub fn succeeded(&mut self, phase: Phase, subject: impl Into<String>) {
        self.record(phase, subject, UnitOutcome::Succeeded);
    }

    pub fn skipped(&mut self, phase: Phase, subject: impl Into<String>, reason: impl Into<String>) {
        self.record(phase, subject, UnitOutcome::Skipped(reason.into()));
    }

    pub fn failed(&mut self, phase: Phase, subject: impl Into<String>, reason: impl ToString) {
        self.record(phase, subject, UnitOutcome::Failed(reason.to_string()));
    }

    /// Keep the key tally of a roster user.
    pub fn record_keys(&mut self, login: impl Into<String>, tally: KeyTally) {
        let login = login.into();
        if tally.failed > 0 {
            warn!(
                "ssh keys user={} total={} added={} existing={} failed={}",
                login, tally.total, tally.added, tally.existing, tally.failed
            );
        } else {
            info!(
                "ssh keys user={} total={} added={} existing={} failed={}",
                login, tally.total, tally.added, tally.existing, tally.failed
            );
        }
        self.key_tallies.push((login, tally));
    }

    #[cfg(test)]
    pub fn records(&self) -> &[UnitRecord] {
        &self.records
    }

    pub fn records_for(&self, phase: Phase) -> impl Iterator<Item = &UnitRecord> {
        self.records.iter().filter(move |r| r.phase == phase)
    }

    /// Outcome of the last unit recorded for `subject` in `phase`
    #[cfg(test)]
    pub fn outcome(&self, phase: Phase, subject: &str) -> Option<&UnitOutcome> {
        self.records_for(phase)
            .filter(|r| r.subject == subject)
            .last()
            .map(|r| &r.outcome)
    }

    #[cfg(test)]
    pub fn key_tally(&self, login: &str) -> Option<&KeyTally> {
        self.key_tallies
            .iter()
            .find(|(l, _)| l == login)
            .map(|(_, tally)| tally)
    }

    pub fn summary(&self, phase: Phase) -> PhaseSummary {
        self.records_for(phase)
            .fold(PhaseSummary::default(), |mut summary, record| {
                match record.outcome {
                    UnitOutcome::Succeeded => summary.succeeded += 1,
                    UnitOutcome::Skipped(_) => summary.skipped += 1,
                    UnitOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// Log one summary line per phase that saw any work.
    pub fn log_summary(&self) {
        for phase in Phase::ALL {
            let summary = self.summary(phase);
            if summary.attempted() == 0 {
                continue;
            }
            info!(
                "summary phase={} succeeded={} skipped={} failed={}",
                phase, summary.succeeded, summary.skipped, summary.failed
            );
        }
        let failures = self.failure_count();
        if failures > 0 {
            warn!("{} unit(s) failed; re-run to retry them", failures);
        }
    }
}
