use orbitscan_core::{
    calculate_precision_bits, get_fractal_config, resolve_numeric_mode, CalcConfig, CalcError,
    CalcMode, ConfigError, ContextScratch, FractalType, ImageRequest, NumericMode, PixelRect,
    ResumeSnapshot, ScanCursor, SymmetryClass, View, WorkItem,
};

fn catalogue_request(id: &str, dots: (u32, u32), config: CalcConfig) -> ImageRequest {
    let fractal = get_fractal_config(id).expect("unknown fractal");
    let view = fractal.default_view(dots, 64).expect("bad default corners");
    ImageRequest::new(fractal.fractal_type, view, config)
}

#[test]
fn catalogue_views_render_natively() {
    for id in ["mandelbrot", "julia", "lambda_sine"] {
        let request = catalogue_request(id, (800, 600), CalcConfig::default());
        assert!(request.validate().is_ok(), "{id}");
        assert_eq!(
            resolve_numeric_mode(NumericMode::Auto, &request.view, request.config.max_iterations),
            NumericMode::Native,
            "{id}"
        );
    }
}

#[test]
fn request_takes_default_params_from_the_catalogue() {
    let request = catalogue_request("julia", (64, 48), CalcConfig::default());
    assert_eq!(request.params, vec![0.3, 0.6]);
    assert_eq!(request.param(1), 0.6);
    assert_eq!(request.param(9), 0.0);

    let request = request.with_params(&[-0.8]);
    assert_eq!(request.param(0), -0.8);
    assert_eq!(request.param(1), 0.0);
}

#[test]
fn request_round_trips_through_json() {
    let config = CalcConfig {
        max_iterations: 1000,
        calc_mode: CalcMode::Diffusion,
        force_symmetry: Some(SymmetryClass::None),
        ..CalcConfig::default()
    };
    let request = catalogue_request("mandelbrot", (320, 240), config);
    let json = serde_json::to_string(&request).unwrap();
    let restored: ImageRequest = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.fractal, FractalType::Mandelbrot);
    assert_eq!(restored.view, request.view);
    assert_eq!(restored.params, request.params);
    assert_eq!(restored.config, request.config);
}

#[test]
fn config_section_may_be_partial() {
    let request = catalogue_request("mandelbrot", (320, 240), CalcConfig::default());
    let mut document = serde_json::to_value(&request).unwrap();
    document["config"] = serde_json::json!({ "max_iterations": 64, "numeric_mode": "fixed_point" });

    let restored: ImageRequest = serde_json::from_value(document).unwrap();
    assert_eq!(restored.config.max_iterations, 64);
    assert_eq!(restored.config.numeric_mode, NumericMode::FixedPoint);
    assert_eq!(restored.config.calc_mode, CalcMode::TwoPass);
    assert_eq!(restored.config.colors, 256);
}

#[test]
fn invalid_requests_are_reported() {
    let view = View::from_f64(-2.0, 2.0, -1.5, 1.5, (0, 10), 64);
    let request = ImageRequest::new(FractalType::Mandelbrot, view, CalcConfig::default());
    assert_eq!(request.validate(), Err(ConfigError::EmptyScreen));

    let view = View::from_f64(1.0, 1.0, -1.5, 1.5, (10, 10), 64);
    let request = ImageRequest::new(FractalType::Mandelbrot, view, CalcConfig::default());
    assert_eq!(request.validate(), Err(ConfigError::DegenerateView));

    let config = CalcConfig {
        max_iterations: 1,
        ..CalcConfig::default()
    };
    let request = catalogue_request("mandelbrot", (10, 10), config);
    let err = CalcError::from(request.validate().unwrap_err());
    assert_eq!(err, CalcError::InvalidConfig(ConfigError::MaxIterations(1)));
}

#[test]
fn deep_zoom_needs_arbitrary_precision() {
    let view = View::from_strings(
        "-0.75",
        "-0.7499999999999999999999999999999999999999",
        "0.1",
        "0.10000000000000000000000000000000000000008",
        (800, 600),
        512,
    )
    .unwrap();
    assert_eq!(resolve_numeric_mode(NumericMode::Auto, &view, 1000), NumericMode::Arbitrary);

    let bits = calculate_precision_bits(&view, 1000);
    assert!(bits.is_power_of_two());
    assert!(bits >= 256, "got {bits}");
}

#[test]
fn snapshot_document_survives_a_round_trip() {
    let scratch = ContextScratch {
        numeric_mode: NumericMode::Arbitrary,
        bit_shift: 48,
        precision_bits: 256,
        magnitude_limit: 4.0,
    };
    let mut resumed = WorkItem::new(PixelRect::new(0, 99, 10, 59), 0, Default::default());
    resumed.x_begin = 42;
    resumed.y_begin = 17;
    resumed.pass_two_queued = true;
    resumed.periodicity_hint = Some(12);
    let mut diffusing = WorkItem::new(PixelRect::new(0, 99, 60, 79), 0, Default::default());
    diffusing.cursor = ScanCursor::diffusion(70_000, 3);

    let snapshot = ResumeSnapshot::new(100, 80, vec![resumed, diffusing], scratch);
    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let restored: ResumeSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, snapshot);
    assert!(restored.check(100, 80).is_ok());
    assert_eq!(restored.items[1].cursor.diffusion_position(), (70_000, 3));
    assert_eq!(restored.pending_area(), 100 * 50 + 100 * 20);
}
