/// Role of the local side of the radio link. Determines C/R bit usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRole {
    /// Mobile station
    Ms,
    /// Base station
    Bs,
}

// SAPs between the entities of the stack
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sap {
    /// L1/LAPDm
    PhSap,
    /// LAPDm/L3, radio link layer primitives (RSLms)
    RllSap,

    /// Custom SAP for inter-entity control messages
    Control,
}
