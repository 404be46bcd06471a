use tower_lsp::{LspService, Server};

use jasmin_lsp_lsp::LspBackend;

#[tokio::main]
async fn main() {
    // Session log file (or stderr); stdout stays reserved for the
    // protocol, so tracing must never write there
    let _log_guard = jasmin_lsp_lsp::logging::init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(LspBackend::new)
        .custom_method("jasmin/setMasterFile", LspBackend::set_master_file)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
}
