/// Identifies one issued panorama request.
///
/// Ids are handed out in strictly increasing order by [`RequestSequence`], so
/// comparing two ids tells which request was issued later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(n: u64) -> Self {
        RequestId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of [`RequestId`]s. The first issued id is `1`.
#[derive(Debug, Default, Clone)]
pub struct RequestSequence {
    last: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }

    /// The most recently issued id, if any.
    pub fn latest(&self) -> Option<RequestId> {
        (self.last > 0).then_some(RequestId(self.last))
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest() == Some(id)
    }
}
