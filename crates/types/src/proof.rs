//! Supported proof systems and the settlement pallets that verify them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A proof system with an on-chain verifier pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofSystem {
    Groth16,
    Fflonk,
    /// zkSync Era Boojum proofs.
    Zksync,
    Risc0,
}

impl ProofSystem {
    pub const ALL: [ProofSystem; 4] = [
        ProofSystem::Groth16,
        ProofSystem::Fflonk,
        ProofSystem::Zksync,
        ProofSystem::Risc0,
    ];

    /// Proof label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ProofSystem::Groth16 => "groth16",
            ProofSystem::Fflonk => "fflonk",
            ProofSystem::Zksync => "zksync",
            ProofSystem::Risc0 => "risc0",
        }
    }

    /// Name of the pallet exposing `submitProof` for this system.
    pub fn pallet(&self) -> &'static str {
        match self {
            ProofSystem::Groth16 => "settlementGroth16Pallet",
            ProofSystem::Fflonk => "settlementFFlonkPallet",
            ProofSystem::Zksync => "settlementZksyncPallet",
            ProofSystem::Risc0 => "settlementRisc0Pallet",
        }
    }
}

impl fmt::Display for ProofSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProofSystem {
    type Err = UnknownProofSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groth16" => Ok(ProofSystem::Groth16),
            "fflonk" => Ok(ProofSystem::Fflonk),
            "zksync" | "boojum" => Ok(ProofSystem::Zksync),
            "risc0" => Ok(ProofSystem::Risc0),
            other => Err(UnknownProofSystem(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Proof type {0} is not valid")]
pub struct UnknownProofSystem(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        for system in ProofSystem::ALL {
            assert_eq!(system.label().parse::<ProofSystem>(), Ok(system));
        }
        assert_eq!(" Boojum ".parse::<ProofSystem>(), Ok(ProofSystem::Zksync));
        assert!("plonky2".parse::<ProofSystem>().is_err());
    }

    #[test]
    fn test_pallets() {
        assert_eq!(ProofSystem::Groth16.pallet(), "settlementGroth16Pallet");
        assert_eq!(ProofSystem::Fflonk.pallet(), "settlementFFlonkPallet");
    }
}
