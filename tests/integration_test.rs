use auto_apply_submit::browser::connect_to_browser_and_page;
use auto_apply_submit::config::Config;
use auto_apply_submit::infrastructure::{CdpFormPage, JsExecutor};
use auto_apply_submit::models::{load_applicant_profile, load_job_postings};
use auto_apply_submit::orchestrator::build_flow;
use auto_apply_submit::services::FormPage;
use auto_apply_submit::utils::logging;
use auto_apply_submit::workflow::JobCtx;
use std::path::Path;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_apply_single_job() {
    let config = Config::from_env();
    let _ = logging::init(&config);

    let (_browser, page) = connect_to_browser_and_page(config.browser_debug_port, &config.start_url)
        .await
        .expect("连接浏览器失败");

    let profile = load_applicant_profile(Path::new(&config.profile_file))
        .await
        .expect("加载申请人配置失败");
    let jobs = load_job_postings(Path::new(&config.jobs_file), &config.job_base_url)
        .await
        .expect("加载职位列表失败");
    let job = jobs.first().expect("职位列表为空");

    let flow = build_flow(&config, &profile).expect("组装流程失败");
    let executor = JsExecutor::new(page);
    let form_page = CdpFormPage::new(&executor);

    let status = flow.run(&form_page, &JobCtx::new(job, 1, 1)).await;
    println!("投递结果: {}", status);
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    let config = Config::from_env();

    let result = connect_to_browser_and_page(config.browser_debug_port, &config.start_url).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_scan_current_page() {
    let config = Config::from_env();

    let (_browser, page) = connect_to_browser_and_page(config.browser_debug_port, &config.start_url)
        .await
        .expect("连接浏览器失败");
    let executor = JsExecutor::new(page);
    let form_page = CdpFormPage::new(&executor);

    let elements = form_page
        .list_interactive_elements()
        .await
        .expect("扫描页面失败");
    for element in &elements {
        let label = form_page.nearest_label(element.handle).await.ok().flatten();
        println!("{} <{}> {:?} {:?}", element.handle, element.tag, element.name, label);
    }
}

#[tokio::test]
#[ignore]
async fn test_load_input_files() {
    let config = Config::from_env();

    let profile = load_applicant_profile(Path::new(&config.profile_file)).await;
    assert!(profile.is_ok(), "应该能够加载申请人配置");

    let jobs = load_job_postings(Path::new(&config.jobs_file), &config.job_base_url).await;
    assert!(jobs.is_ok(), "应该能够加载职位列表");
    println!("找到 {} 个职位", jobs.unwrap().len());
}
