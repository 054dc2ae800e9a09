//! Built-in gas-free deployments.
//!
//! Each deployment is an immutable [`NetworkConfig`] record passed
//! explicitly to the signer and address deriver. Nothing here is global
//! mutable state.

use alloy_primitives::{address, hex};

use crate::address::TronAddress;
use crate::authorization::SigningDomain;

/// Chain id of the Nile testnet (`0xcd8690dc`).
pub const NILE_CHAIN_ID: u64 = 0xcd86_90dc;

/// Chain id of TRON mainnet (`0x2b6653dc`).
pub const MAINNET_CHAIN_ID: u64 = 0x2b66_53dc;

/// Chain id of the Shasta testnet (`0x94a9059e`). No gas-free deployment is known there.
pub const SHASTA_CHAIN_ID: u64 = 0x94a9_059e;

/// Proxy creation bytecode deployed behind the Nile controller.
pub const NILE_CREATION_CODE: &[u8] = &hex!(
    "60a06040908082526103e5803803809161001982856101d6565b833981019082818303126101d2576100308161020d56"
    "5b91602091828101519060018060401b0382116101d2570181601f820112156101d25780519061005e8261022a565b92"
    "61006b875194856101d6565b8284528483830101116101d25783905f5b8381106101be5750505f9183010152823b1561"
    "017a5780516100b3575b50506080525161013c90816102a982396080518160180152f35b8351635c60da1b60e01b8152"
    "9082826004816001600160a01b0388165afa918215610170575f9261012d575b50905f80838561011c9695519101845a"
    "f4903d15610124573d6101018161022a565b9061010e885192836101d6565b81525f81943d92013e610245565b505f80"
    "610099565b60609250610245565b90918382813d8311610169575b61014481836101d6565b810103126101665750905f"
    "8061015d61011c959461020d565b939450506100df565b80fd5b503d61013a565b85513d5f823e3d90fd5b835162461b"
    "cd60e51b815260048101839052601b60248201527f626561636f6e2073686f756c64206265206120636f6e7472616374"
    "00000000006044820152606490fd5b81810183015185820184015285920161007c565b5f80fd5b601f909101601f1916"
    "8101906001600160401b038211908210176101f957604052565b634e487b7160e01b5f52604160045260245ffd5b5160"
    "01600160a81b03811681036101d2576001600160a01b031690565b6001600160401b0381116101f957601f01601f1916"
    "60200190565b9061026c575080511561025a57805190602001fd5b604051630a12f52160e11b8152600490fd5b815115"
    "8061029f575b61027d575090565b604051639996b31560e01b81526001600160a01b039091166004820152602490fd5b"
    "50803b1561027556fe60806040819052635c60da1b60e01b81526020816004817f000000000000000000000000000000"
    "00000000000000000000000000000000006001600160a01b03165afa9081156100ae575f91610056575f6100e8565b60"
    "20903d82116100a6575b601f8201601f1916810167ffffffffffffffff8111828210176100925761008c935060405201"
    "6100b9565b5f610050565b634e487b7160e01b84526041600452602484fd5b3d9150610061565b6040513d5f823e3d90"
    "fd5b602090607f1901126100e4576080516001600160a81b03811681036100e4576001600160a01b031690565b5f80fd"
    "5b5f808092368280378136915af43d82803e15610102573d90f35b3d90fdfea26474726f6e5822122019fba3a984dfef"
    "08920adc4d0e531dbd369df1dec237bfb02ce668f5d8e2704064736f6c63430008140033"
);

/// Proxy creation bytecode deployed behind the mainnet controller.
///
/// Differs from [`NILE_CREATION_CODE`] only in the trailing compiler metadata hash.
pub const MAINNET_CREATION_CODE: &[u8] = &hex!(
    "60a06040908082526103e5803803809161001982856101d6565b833981019082818303126101d2576100308161020d56"
    "5b91602091828101519060018060401b0382116101d2570181601f820112156101d25780519061005e8261022a565b92"
    "61006b875194856101d6565b8284528483830101116101d25783905f5b8381106101be5750505f9183010152823b1561"
    "017a5780516100b3575b50506080525161013c90816102a982396080518160180152f35b8351635c60da1b60e01b8152"
    "9082826004816001600160a01b0388165afa918215610170575f9261012d575b50905f80838561011c9695519101845a"
    "f4903d15610124573d6101018161022a565b9061010e885192836101d6565b81525f81943d92013e610245565b505f80"
    "610099565b60609250610245565b90918382813d8311610169575b61014481836101d6565b810103126101665750905f"
    "8061015d61011c959461020d565b939450506100df565b80fd5b503d61013a565b85513d5f823e3d90fd5b835162461b"
    "cd60e51b815260048101839052601b60248201527f626561636f6e2073686f756c64206265206120636f6e7472616374"
    "00000000006044820152606490fd5b81810183015185820184015285920161007c565b5f80fd5b601f909101601f1916"
    "8101906001600160401b038211908210176101f957604052565b634e487b7160e01b5f52604160045260245ffd5b5160"
    "01600160a81b03811681036101d2576001600160a01b031690565b6001600160401b0381116101f957601f01601f1916"
    "60200190565b9061026c575080511561025a57805190602001fd5b604051630a12f52160e11b8152600490fd5b815115"
    "8061029f575b61027d575090565b604051639996b31560e01b81526001600160a01b039091166004820152602490fd5b"
    "50803b1561027556fe60806040819052635c60da1b60e01b81526020816004817f000000000000000000000000000000"
    "00000000000000000000000000000000006001600160a01b03165afa9081156100ae575f91610056575f6100e8565b60"
    "20903d82116100a6575b601f8201601f1916810167ffffffffffffffff8111828210176100925761008c935060405201"
    "6100b9565b5f610050565b634e487b7160e01b84526041600452602484fd5b3d9150610061565b6040513d5f823e3d90"
    "fd5b602090607f1901126100e4576080516001600160a81b03811681036100e4576001600160a01b031690565b5f80fd"
    "5b5f808092368280378136915af43d82803e15610102573d90f35b3d90fdfea26474726f6e58221220309a2919b7a1b2"
    "03f1a7a1c544a7d671bb94b0adf8a39e4c9b6eeb6d03939ffe64736f6c63430008140033"
);

/// A gas-free deployment: chain constants plus the endpoints that serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network path segment used by the relay (`nile`, `tron`).
    pub name: &'static str,
    /// Numeric chain identifier used in the signing domain.
    pub chain_id: u64,
    /// Gas-free controller; the signing domain's verifying contract and the CREATE2 deployer.
    pub controller: TronAddress,
    /// Beacon the proxies delegate to.
    pub beacon: TronAddress,
    /// Proxy creation bytecode.
    pub creation_code: &'static [u8],
    /// USDT contract on this network.
    pub usdt: TronAddress,
    /// Relay API base URL.
    pub relay_base_url: &'static str,
    /// TronGrid full-node base URL.
    pub ledger_base_url: &'static str,
}

impl NetworkConfig {
    /// The Nile testnet deployment.
    #[must_use]
    pub const fn nile() -> Self {
        Self {
            name: "nile",
            chain_id: NILE_CHAIN_ID,
            // THQGuFzL87ZqhxkgqYEryRAd7gqFqL5rdc
            controller: TronAddress::new(address!("518688fbb39ccf1253f2b1217679fbe316329288")),
            // TLtCGmaxH3PbuaF6kbybwteZcHptEdgQGC
            beacon: TronAddress::new(address!("77b6b1f66f7a45f4f4981a1f974032714e046233")),
            creation_code: NILE_CREATION_CODE,
            // TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf
            usdt: TronAddress::new(address!("eca9bc828a3005b9a3b909f2cc5c2a54794de05f")),
            relay_base_url: "https://open-test.gasfree.io",
            ledger_base_url: "https://nile.trongrid.io",
        }
    }

    /// The TRON mainnet deployment.
    #[must_use]
    pub const fn mainnet() -> Self {
        Self {
            name: "tron",
            chain_id: MAINNET_CHAIN_ID,
            // TFFAMQLZybALaLb4uxHA9RBE7pxhUAjF3U
            controller: TronAddress::new(address!("39dd12a54e2bab7c82aa14a1e158b34263d2d510")),
            // TSP9UW6FQhT76XD2jWA6ipGMx3yGbjDffP
            beacon: TronAddress::new(address!("b4090d337ef8fbf880c1c287412cfb72324d711e")),
            creation_code: MAINNET_CREATION_CODE,
            // TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t
            usdt: TronAddress::new(address!("a614f803b6fd780986a42c78ec9c7f77e6ded13c")),
            relay_base_url: "https://open.gasfree.io",
            ledger_base_url: "https://api.trongrid.io",
        }
    }

    /// Looks up a built-in deployment by name.
    ///
    /// Accepts `nile`, `tron` and `mainnet` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`UnknownNetwork`] for any other name.
    pub fn by_name(name: &str) -> Result<Self, UnknownNetwork> {
        match name.to_ascii_lowercase().as_str() {
            "nile" => Ok(Self::nile()),
            "tron" | "mainnet" => Ok(Self::mainnet()),
            _ => Err(UnknownNetwork(name.to_owned())),
        }
    }

    /// Returns the signing domain bound to this deployment's controller.
    #[must_use]
    pub fn signing_domain(&self) -> SigningDomain {
        SigningDomain::new(self.chain_id, self.controller)
    }
}

/// No built-in deployment matches the requested network name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gas-free network `{0}` (expected nile or tron)")]
pub struct UnknownNetwork(pub String);
