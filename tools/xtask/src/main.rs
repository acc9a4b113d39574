//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 editor-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `config-check`: 检查宿主配置文件（解析、校验、无界面试运行），`--log <level>` 输出引擎日志

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use editor_host::{HeadlessRunner, HostConfig, Level, init_logging, parse_level};
use editor_runtime::Host;
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "editor-runtime", "--html"]);
            run("cargo llvm-cov -p editor-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，避免稀释引擎与宿主的覆盖率
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "config-check" => {
            let options = ConfigCheckArgs::parse(args)?;
            if let Some(level) = options.log {
                init_logging(level);
            }
            config_check(options.path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 editor-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  config-check    检查宿主配置文件

CONFIG-CHECK:
  cargo xtask config-check [path] [--log <level>]

  不带参数：检查 config/ 下所有 .json 文件
  带路径参数：检查指定文件或目录
  --log：输出试运行过程中的引擎日志（trace / debug / info / warn / error）

  检查内容：
    - JSON 语法与字段类型
    - 配置校验（面板名称、高度、帧间隔、引擎时长）
    - 无界面试运行：依次切换到每个面板，确认偏移收敛到目标

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo config-check  -> cargo xtask config-check
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 默认配置目录（相对于 workspace root）
const DEFAULT_CONFIG_DIR: &str = "config";

/// 试运行时每个面板最多运行的帧数
const MAX_FRAMES_PER_PANEL: usize = 1_000;

/// config-check 的参数：`[path] [--log <level>]`
#[derive(Debug, Default, PartialEq)]
struct ConfigCheckArgs {
    path: Option<String>,
    log: Option<Level>,
}

impl ConfigCheckArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Self::default();
        while let Some(arg) = args.next() {
            if arg == "--log" {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--log 需要指定日志级别"))?;
                let level = parse_level(&value)
                    .ok_or_else(|| anyhow::anyhow!("未知日志级别: {value}"))?;
                options.log = Some(level);
            } else if options.path.is_none() {
                options.path = Some(arg);
            } else {
                anyhow::bail!("多余的参数: {arg}");
            }
        }
        Ok(options)
    }
}

/// 单个文件的问题
struct Finding {
    file: String,
    message: String,
}

/// 检查结果
#[derive(Default)]
struct ConfigCheckResult {
    files_checked: usize,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

/// 执行配置检查
fn config_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_config_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_CONFIG_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认配置目录不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
                    dir.display()
                );
            }
            collect_config_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let mut result = ConfigCheckResult::default();
    for file in &files {
        check_config_file(file, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("配置检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有配置文件
fn collect_config_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个配置文件
fn check_config_file(file: &Path, result: &mut ConfigCheckResult) {
    let id = file.display().to_string();
    result.files_checked += 1;

    let config = match HostConfig::read(file) {
        Ok(config) => config,
        Err(e) => {
            result.errors.push(Finding {
                file: id,
                message: e.to_string(),
            });
            return;
        }
    };

    for message in dry_run(&config) {
        result.warnings.push(Finding {
            file: id.clone(),
            message,
        });
    }
}

/// 无界面试运行：依次切换到每个面板再隐藏
fn dry_run(config: &HostConfig) -> Vec<String> {
    let mut problems = Vec::new();
    let mut runner = HeadlessRunner::new(config.clone());

    let targets = config
        .panels
        .iter()
        .map(|panel| Some(panel.name.as_str()))
        .chain([Some(config.ime_name.as_str()), None]);

    for target in targets {
        let label = target.unwrap_or("none");
        match target {
            Some(name) => runner.request_show(name),
            None => runner.request_hide(),
        };
        runner.run_until_idle(MAX_FRAMES_PER_PANEL);

        if !runner.is_idle() {
            problems.push(format!(
                "切换到 {label} 后 {MAX_FRAMES_PER_PANEL} 帧内没有结束"
            ));
            continue;
        }
        if runner.current_editor() != target {
            problems.push(format!(
                "切换到 {label} 后当前面板为 {}",
                runner.current_editor().unwrap_or("none")
            ));
        }
        if let Some(host) = runner.host() {
            let expected = host.target_offset(host.current_editor());
            if (host.offset() - expected).abs() > 0.5 {
                problems.push(format!(
                    "切换到 {label} 后偏移为 {}，目标为 {expected}",
                    host.offset()
                ));
            }
        }
    }
    problems
}

/// 输出检查结果
fn print_check_result(result: &ConfigCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置文件", result.files_checked);
    eprintln!();

    for finding in &result.errors {
        eprintln!("[ERROR] {}: {}", finding.file, finding.message);
    }
    for finding in &result.warnings {
        eprintln!("[WARN] {}: {}", finding.file, finding.message);
    }

    let error_count = result.errors.len();
    let warn_count = result.warnings.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
