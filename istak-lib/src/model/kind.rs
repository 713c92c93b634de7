//! Resource kinds served by the backend

/// The kinds of remote resource a table can be built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Catalog items (inventory view).
    Item,
    /// People who borrow items.
    Borrower,
    /// Borrow transactions.
    Transaction,
    /// Items viewed as QR-code targets.
    QrTarget,
}

impl ResourceKind {
    /// Collection path segment under the API prefix, e.g. `items`.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Item | ResourceKind::QrTarget => "items",
            ResourceKind::Borrower => "borrowers",
            ResourceKind::Transaction => "transactions",
        }
    }

    /// Whether records of this kind can carry a file attachment.
    ///
    /// Mutations for these kinds are always multipart encoded.
    pub fn supports_attachments(&self) -> bool {
        matches!(
            self,
            ResourceKind::Item | ResourceKind::QrTarget | ResourceKind::Borrower
        )
    }

    /// Singular human label, used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Item => "Item",
            ResourceKind::Borrower => "Borrower",
            ResourceKind::Transaction => "Transaction",
            ResourceKind::QrTarget => "QR target",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
