//! Built-in network table used when the config file lists no networks.
//!
//! `${VAR}` placeholders are expanded by the loader; endpoints whose
//! variable is unset are dropped there.

use crate::config::schema::NetworkProfile;

fn profile(
    name: &str,
    chain_id: u64,
    currency_symbol: &str,
    explorer_url: &str,
    rpc_urls: &[&str],
) -> NetworkProfile {
    NetworkProfile {
        name: name.to_string(),
        chain_id,
        currency_symbol: currency_symbol.to_string(),
        explorer_url: Some(explorer_url.to_string()),
        rpc_urls: rpc_urls.iter().map(|u| u.to_string()).collect(),
    }
}

/// Public testnets with their fallback endpoints.
pub fn builtin_networks() -> Vec<NetworkProfile> {
    vec![
        profile(
            "Ethereum Sepolia",
            11155111,
            "ETH",
            "https://sepolia.etherscan.io",
            &[
                "https://sepolia.infura.io/v3/${INFURA_PROJECT_ID}",
                "https://rpc.sepolia.org",
                "https://ethereum-sepolia.publicnode.com",
                "https://sepolia.drpc.org",
            ],
        ),
        profile(
            "Base Sepolia",
            84532,
            "ETH",
            "https://sepolia-explorer.base.org",
            &[
                "https://sepolia.base.org",
                "https://base-sepolia.drpc.org",
                "https://base-sepolia-rpc.publicnode.com",
            ],
        ),
        profile(
            "Avalanche Fuji C-Chain",
            43113,
            "AVAX",
            "https://testnet.snowtrace.io",
            &[
                "https://api.avax-test.network/ext/bc/C/rpc",
                "https://avalanche-fuji-c-chain.publicnode.com",
                "https://ava-testnet.public.blastapi.io/ext/bc/C/rpc",
            ],
        ),
        profile(
            "Optimism Sepolia",
            11155420,
            "ETH",
            "https://sepolia-optimism.etherscan.io",
            &[
                "https://sepolia.optimism.io",
                "https://optimism-sepolia.drpc.org",
                "https://optimism-sepolia.publicnode.com",
            ],
        ),
        profile(
            "Polygon Amoy",
            80002,
            "POL",
            "https://amoy.polygonscan.com",
            &[
                "https://rpc-amoy.polygon.technology",
                "https://polygon-amoy.drpc.org",
                "https://polygon-amoy-bor-rpc.publicnode.com",
            ],
        ),
        profile(
            "Arbitrum Sepolia",
            421614,
            "ETH",
            "https://sepolia.arbiscan.io",
            &[
                "https://sepolia-rollup.arbitrum.io/rpc",
                "https://arbitrum-sepolia.drpc.org",
            ],
        ),
        profile(
            "Binance Smart Chain Testnet",
            97,
            "BNB",
            "https://testnet.bscscan.com",
            &[
                "https://data-seed-prebsc-1-s1.binance.org:8545/",
                "https://data-seed-prebsc-2-s1.binance.org:8545/",
            ],
        ),
        profile(
            "Fantom Testnet",
            4002,
            "FTM",
            "https://testnet.ftmscan.com",
            &[
                "https://rpc.testnet.fantom.network/",
                "https://fantom-testnet.public.blastapi.io/",
            ],
        ),
        profile(
            "Moonbase Alpha",
            1287,
            "DEV",
            "https://moonbase.moonscan.io",
            &[
                "https://rpc.api.moonbase.moonbeam.network",
                "https://moonbeam-alpha.public.blastapi.io",
            ],
        ),
    ]
}
