/*
[INPUT]:  CDP_API_KEY_ID / CDP_API_KEY_SECRET and a request method, host and path
[OUTPUT]: One bearer token for a manual curl call
[POS]:    Examples - token minting demonstration
[UPDATE]: When key loading or token claims change
*/

use luxbin_cdp_adapter::*;

/// Example: mint a token for a single request
///
/// cargo run --example sign_token -- GET api.cdp.coinbase.com /onramp/v1/buy/options
#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [method, host, path] = args.as_slice() else {
        eprintln!("usage: sign_token <METHOD> <HOST> <PATH>");
        std::process::exit(2);
    };

    let key = match KeyMaterialLoader::from_env().load() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Failed to load key material: {}", e);
            std::process::exit(1);
        }
    };

    let binding = RequestBinding::new(method, host, path);
    match TokenSigner::new().mint(&key, &binding) {
        Ok(token) => {
            eprintln!("uri: {}", binding.uri());
            eprintln!("expires in {}s", token.claims.exp - token.claims.nbf);
            println!("{}", token.as_str());
        }
        Err(e) => {
            eprintln!("Failed to sign token: {}", e);
            std::process::exit(1);
        }
    }
}
