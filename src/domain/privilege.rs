/// Proof that privileged commands can be run, and how to run them.
///
/// Only a `PrivilegeEscalation` collaborator hands these out in production, and
/// stop/install/reload/start all demand one, so a missing privilege shows up as a
/// typed failure before the service is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeContext {
    escalation: Option<Escalation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Escalation {
    program: String,
    args: Vec<String>,
}

impl PrivilegeContext {
    /// The current process already holds the required privilege.
    pub fn already_elevated() -> Self {
        Self { escalation: None }
    }

    /// Privileged commands go through `program args... <command>`, e.g. `sudo -n`.
    pub fn escalated(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            escalation: Some(Escalation {
                program: program.into(),
                args,
            }),
        }
    }

    pub fn is_escalated(&self) -> bool {
        self.escalation.is_some()
    }

    /// Full argv for running `program args` at this privilege level.
    pub fn argv(&self, program: &str, args: &[&str]) -> (String, Vec<String>) {
        match &self.escalation {
            None => (
                program.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ),
            Some(escalation) => {
                let mut full = escalation.args.clone();
                full.push(program.to_string());
                full.extend(args.iter().map(|a| a.to_string()));
                (escalation.program.clone(), full)
            }
        }
    }
}
