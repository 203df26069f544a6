//! Verifies a claim batch against receipts fetched from an Ethereum or OP stack node (Base for
//! the default Kwenta config) and, optionally, runs or proves it in the SP1 zkVM.
//!
//! ```shell
//! RUST_LOG=info cargo run --release -- --input data/input.json
//! RUST_LOG=info cargo run --release -- --input data/input.json --execute
//! RUST_LOG=info cargo run --release -- --input data/input.json --prove --proof-out claim.proof
//! ```

use alloy_provider::ProviderBuilder;
use claim_lib::{Batch, BatchSummary, ClaimConfig, ClaimInput, ClaimPublicValues, EncodedBatch};
use claim_script::{collect_witnesses, load_json, Cache, RpcSource};

use clap::Parser;
use eyre::{ensure, eyre, WrapErr};
use sp1_sdk::{include_elf, ProverClient, SP1Stdin};
use std::path::PathBuf;
use tracing::info;

/// The ELF of the claim program.
pub const CLAIM_ELF: &[u8] = include_elf!("claim-program");

/// The arguments for the command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, help = "batch json (blockNumbers, txIdxs, logIdxs, numClaims)")]
    input: PathBuf,

    #[clap(long, help = "claim config json, defaults to the Kwenta executor fee claim")]
    config: Option<PathBuf>,

    #[clap(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: String,

    #[clap(long, help = "block cache file")]
    cache: Option<PathBuf>,

    #[clap(long, group = "mode")]
    execute: bool,

    #[clap(long, group = "mode")]
    prove: bool,

    #[clap(long, default_value = "claim.proof")]
    proof_out: PathBuf,
}

fn print_summary(summary: &BatchSummary) {
    println!("first claim: {}", summary.first_claim_id);
    println!("last claim:  {}", summary.last_claim_id);
    println!("identity:    {}", summary.identity);
    println!("total:       {}", summary.total_amount);
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    sp1_sdk::utils::setup_logger();
    let args = Args::parse();

    let batch: Batch = load_json(&args.input)?;
    let config: ClaimConfig = args
        .config
        .as_ref()
        .map(|path| load_json(path))
        .transpose()?
        .unwrap_or_default();

    // Everything that needs no event data fails before touching the network.
    let encoded = EncodedBatch::encode(&batch, &config).wrap_err("batch rejected")?;
    info!(
        num_claims = encoded.mask().num_claims(),
        "batch encoded, fetching receipts"
    );

    let mut cache = match &args.cache {
        Some(path) => Cache::open(path)?,
        None => Cache::default(),
    };
    let rpc_url = args.rpc_url.parse()?;
    info!("Setting up rpc with URL {}", rpc_url);
    let source = RpcSource::new(ProviderBuilder::new().on_http(rpc_url));

    let witnesses = collect_witnesses(&encoded, &source, &mut cache).await?;
    cache.save()?;

    let input = ClaimInput {
        batch,
        config,
        witnesses,
    };
    let native = input.clone().verify().wrap_err("batch rejected")?;
    println!("✅ batch verified");
    print_summary(&native.summary());

    if !args.execute && !args.prove {
        return Ok(());
    }

    let client = ProverClient::from_env();
    let mut stdin = SP1Stdin::new();
    stdin.write(&input);

    if args.execute {
        let (output, report) = client
            .execute(CLAIM_ELF, &stdin)
            .run()
            .map_err(|err| eyre!("execution failed: {err}"))?;
        println!("Program executed successfully.");
        println!("public values: 0x{}", hex::encode(output.as_slice()));

        let committed = ClaimPublicValues::decode(output.as_slice())?;
        ensure!(
            committed == native,
            "committed values differ from native verification"
        );
        println!("Number of cycles: {}", report.total_instruction_count());
    } else {
        let (pk, vk) = client.setup(CLAIM_ELF);

        let proof = client
            .prove(&pk, &stdin)
            .run()
            .map_err(|err| eyre!("failed to generate proof: {err}"))?;
        println!("Successfully generated proof!");

        client
            .verify(&proof, &vk)
            .map_err(|err| eyre!("failed to verify proof: {err}"))?;
        println!("Successfully verified proof!");

        let committed = ClaimPublicValues::decode(proof.public_values.as_slice())?;
        ensure!(
            committed == native,
            "proven values differ from native verification"
        );
        proof
            .save(&args.proof_out)
            .map_err(|err| eyre!("failed to save proof: {err}"))?;
        println!("proof written to {}", args.proof_out.display());
    }

    Ok(())
}
