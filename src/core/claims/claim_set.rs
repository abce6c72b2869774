// In-process claim set keyed by message id.
//
// A handler claims a message before acting on it so that two gateway events
// for the same message cannot both run the action. The claim is dropped when
// the guard goes out of scope.

use dashmap::DashSet;

#[derive(Default)]
pub struct ClaimSet {
    claimed: DashSet<u64>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `message_id`, or `None` if someone else holds it.
    pub fn claim(&self, message_id: u64) -> Option<Claim<'_>> {
        if self.claimed.insert(message_id) {
            Some(Claim {
                set: self,
                message_id,
            })
        } else {
            None
        }
    }
}

pub struct Claim<'a> {
    set: &'a ClaimSet,
    message_id: u64,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.set.claimed.remove(&self.message_id);
    }
}
