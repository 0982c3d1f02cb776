// Entities taking part in the stack. Layer 3 is split in the owning procedure (Mm)
// and the radio resource user of the RLL SAP (Rr)
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum GsmEntity {
    /// Layer 1, burst transport
    Phy,
    /// LAPDm data link layer
    Lapdm,
    /// Radio Resource management, user of the RLL SAP
    Rr,
    /// Mobility Management, owner of dedicated-channel procedures
    Mm,

    /// Any other user entity. SAP determines routing
    User,
}
