fn main() -> anyhow::Result<()> {
    dynamic_form::cli::main()
}
