use clap::Parser;
use cli::{Cli, Commands, OptionsAction, ReportsAction, SettingsAction};
use config::Config;
use dialoguer::Confirm;
use error::{IrshadError, Result};
use irshad_common::{PageBudget, ReportData, ReportKind};
use irshad_reports::export::{ExportOutcome, Exporter, RenderStrategy};
use irshad_reports::fonts::FontRegistry;
use irshad_reports::raster::CanvasRasterizer;
use irshad_reports::settings::{AppSettings, SettingsStore};
use irshad_reports::storage::{new_record, OptionStore, ReportStore};
use irshad_reports::{assets, cli, config, error, report_view, scanner, template};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Export { input, kind, output, charts, template, no_store } => {
            println!("📄 irshad - تصدير التقرير\n");

            // 1. بيانات التقرير
            println!("[1/3] قراءة بيانات التقرير...");
            let content = std::fs::read_to_string(&input)
                .map_err(|_| IrshadError::FileNotFound(input.display().to_string()))?;
            let data: ReportData = serde_json::from_str(&content)?;
            let settings = SettingsStore::open(&config.data_dir()?).current();
            println!("✔ {}\n", data.title);

            // 2. PDF
            println!("[2/3] إنشاء PDF...");
            let base_dir = input.parent().map(Path::to_path_buf);
            let root = build_root(&data, kind, &settings, template.as_deref())?;
            let exporter = build_exporter(&config, base_dir).with_progress(true);
            let strategy = RenderStrategy::from(charts.unwrap_or(config.chart_mode));
            let outcome = exporter.export(&data, kind, &root, strategy).await?;

            let output_dir = output_dir(output, &config);
            let path = outcome.write_to(&output_dir)?;
            print_outcome(&outcome, &path);

            // 3. سجل التقارير
            if !no_store {
                println!("[3/3] حفظ سجل التقرير...");
                let store = ReportStore::open(&config.data_dir()?);
                let record = new_record(kind, &data)?;
                println!("✔ رقم التقرير: {}", record.id);
                store.add(record)?;
            }

            println!("\n✅ اكتمل التصدير");
        }

        Commands::Batch { folder, kind, output, charts, recursive } => {
            println!("🗂 irshad - تصدير جماعي\n");

            println!("[1/2] البحث عن ملفات التقارير...");
            let files = scanner::scan_folder(&folder, recursive)?;
            println!("✔ {} ملف\n", files.len());

            if files.is_empty() {
                return Err(IrshadError::EmptyContent);
            }

            println!("[2/2] التصدير...");
            let settings = SettingsStore::open(&config.data_dir()?).current();
            let exporter = build_exporter(&config, Some(folder.clone()));
            let strategy = RenderStrategy::from(charts.unwrap_or(config.chart_mode));
            let output_dir = output.unwrap_or_else(|| folder.clone());
            let store = ReportStore::open(&config.data_dir()?);

            let mut exported = 0;
            for file in &files {
                let result = async {
                    let data = file.load()?;
                    let root = report_view::render(&data, kind, &settings);
                    let outcome = exporter.export(&data, kind, &root, strategy).await?;
                    let path = outcome.write_to(&output_dir)?;
                    store.add(new_record(kind, &data)?)?;
                    Ok::<_, IrshadError>((outcome, path))
                }
                .await;

                match result {
                    Ok((outcome, path)) => {
                        exported += 1;
                        println!("✔ {} → {} ({} صفحات)", file.file_name, path.display(), outcome.page_count());
                    }
                    Err(e) => println!("✗ {}: {}", file.file_name, e),
                }
            }

            println!("\n✅ تم تصدير {} من {}", exported, files.len());
        }

        Commands::Reports { action } => {
            let store = ReportStore::open(&config.data_dir()?);
            match action {
                ReportsAction::List => {
                    let reports = store.list();
                    if reports.is_empty() {
                        println!("لا توجد تقارير محفوظة");
                    }
                    for report in reports {
                        println!("{}  {}  {}  {}", report.id, report.date, report.kind, report.title);
                    }
                }
                ReportsAction::Show { id } => {
                    let report = store.get(&id)?;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                ReportsAction::Delete { id, yes } => {
                    let report = store.get(&id)?;
                    let confirmed = yes
                        || Confirm::new()
                            .with_prompt(format!("حذف \"{}\"؟", report.title))
                            .default(false)
                            .interact()
                            .map_err(|e| IrshadError::Prompt(e.to_string()))?;
                    if confirmed {
                        store.delete(&id)?;
                        println!("✔ تم حذف التقرير {}", id);
                    } else {
                        println!("تم الإلغاء");
                    }
                }
            }
        }

        Commands::Settings { action } => {
            let store = SettingsStore::open(&config.data_dir()?);
            match action {
                SettingsAction::Show => print_settings(&store.current()),
                SettingsAction::Set { key, value } => {
                    store.set(&key, &value)?;
                    println!("✔ تم حفظ {}", key);
                }
                SettingsAction::Cycle { cycle } => {
                    let settings = store.update(|s| {
                        s.switch_cycle(cycle);
                        Ok(())
                    })?;
                    println!("✔ الطور: {}", settings.cycle.education_label());
                }
            }
        }

        Commands::Options { action } => {
            let store = OptionStore::open(&config.data_dir()?);
            match action {
                OptionsAction::Import { name, file } => {
                    let content = std::fs::read_to_string(&file)
                        .map_err(|_| IrshadError::FileNotFound(file.display().to_string()))?;
                    let table = store.import(&name, &content)?;
                    println!("✔ {}: {} عنصر", name, table.len());
                }
                OptionsAction::Export { name, output } => {
                    let json = store.load(&name)?.export()?;
                    match output {
                        Some(path) => {
                            std::fs::write(&path, json)?;
                            println!("✔ {}", path.display());
                        }
                        None => println!("{}", json),
                    }
                }
                OptionsAction::List => {
                    for name in store.names() {
                        println!("{}", name);
                    }
                }
            }
        }

        Commands::Config { set_font, set_charts, show } => {
            if let Some(path) = set_font {
                config.set_font(path)?;
                println!("✔ تم تعيين الخط");
            }

            if let Some(mode) = set_charts {
                config.chart_mode = mode;
                config.save()?;
                println!("✔ الرسوم البيانية: {}", mode);
            }

            if show {
                println!("الإعدادات:");
                println!(
                    "  الخط: {}",
                    config
                        .font_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "تلقائي".to_string())
                );
                println!("  الهامش: {}mm", config.margin_mm);
                println!("  دقة الالتقاط: {}x", config.capture_scale);
                println!("  الرسوم البيانية: {}", config.chart_mode);
                println!("  مجلد البيانات: {}", config.data_dir()?.display());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn build_exporter(config: &Config, base_dir: Option<PathBuf>) -> Exporter {
    let fonts = Arc::new(FontRegistry::new(config.font_path.clone()));
    let rasterizer = CanvasRasterizer::new(assets::AssetStore::new(base_dir))
        .with_scale(config.capture_scale);
    Exporter::new(
        fonts,
        Arc::new(rasterizer),
        PageBudget::a4_with_margin(config.margin_mm),
    )
}

fn build_root(
    data: &ReportData,
    kind: ReportKind,
    settings: &AppSettings,
    template_path: Option<&Path>,
) -> Result<irshad_common::Element> {
    match template_path {
        Some(path) => {
            let mut root = template::load_template(path)?;
            report_view::apply_cycle(&mut root, settings.cycle);
            Ok(root)
        }
        None => Ok(report_view::render(data, kind, settings)),
    }
}

fn output_dir(output: Option<PathBuf>, config: &Config) -> PathBuf {
    output
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_outcome(outcome: &ExportOutcome, path: &Path) {
    println!("✔ PDF: {} ({} صفحات)", path.display(), outcome.page_count());
    if outcome.used_slicer {
        println!("  - لا توجد أقسام صفحات، تم تقسيم التقرير آلياً");
    }
    if outcome.used_fallback_font {
        println!("  ⚠ لم يتم العثور على خط عربي؛ استخدم: irshad config --set-font <ملف.ttf>");
    }
    if outcome.skipped_charts {
        println!("  ⚠ تم التصدير بدون الرسوم البيانية");
    }
    println!();
}

fn print_settings(settings: &AppSettings) {
    println!("إعدادات المؤسسة:");
    println!("  المؤسسة: {}", settings.school_name);
    println!("  مستشار التوجيه: {}", settings.counselor_name);
    println!("  الطور: {}", settings.cycle.education_label());
    println!("  المستويات: {}", settings.effective_levels().join("، "));
    println!("  الأفواج: {}", settings.groups.join("، "));
    println!("  الفصول: {}", settings.semesters.join("، "));
    println!("  المنطقة الزمنية: {}", settings.timezone);
}
