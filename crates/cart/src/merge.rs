use super::Cart;

/// Outcome of reconciling the local cart against a server snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
	/// The server holds nothing while we do: keep local storage as is and send our
	/// cart up so the session catches up.
	KeepLocal { push: Cart },
	/// The server snapshot replaces the local cart verbatim.
	AdoptServer(Cart),
}

impl Resolution {
	/// Splits into the cart that should be visible locally and what, if anything, to push.
	#[must_use]
	pub fn into_parts(self) -> (Cart, Option<Cart>) {
		match self {
			Self::KeepLocal { push } => (push.clone(), Some(push)),
			Self::AdoptServer(server) => (server, None),
		}
	}
}

/// Two-way merge between the local and server replicas.
///
/// | local | server | result              |
/// |-------|--------|---------------------|
/// | items | empty  | keep local, push it |
/// | any   | items  | adopt server        |
/// | empty | empty  | adopt server        |
#[must_use]
pub fn merge(local: &Cart, server: &Cart) -> Resolution {
	if !local.is_empty() && server.is_empty() {
		Resolution::KeepLocal {
			push: local.clone(),
		}
	} else {
		Resolution::AdoptServer(server.clone())
	}
}
