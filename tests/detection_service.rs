use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use table_text::{
    BorderBox, DetectionError, DetectionService, DetectionSettings, DetectorError, ImageError,
    ImageFrame, Polygon, TextDetector, TextField,
};

/// Returns a fixed set of polygons and records the size of every image it sees.
struct StubDetector {
    polygons: Vec<Polygon>,
    seen: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl StubDetector {
    fn new(polygons: Vec<Polygon>) -> (Self, Arc<Mutex<Vec<(u32, u32)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let detector = Self {
            polygons,
            seen: Arc::clone(&seen),
        };
        (detector, seen)
    }
}

impl TextDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&self, image: &ImageFrame) -> Result<Vec<Polygon>, DetectorError> {
        self.seen
            .lock()
            .unwrap()
            .push((image.width(), image.height()));
        Ok(self.polygons.clone())
    }
}

struct FailingDetector;

impl TextDetector for FailingDetector {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn detect(&self, _: &ImageFrame) -> Result<Vec<Polygon>, DetectorError> {
        Err(DetectorError::Inference("out of memory".into()))
    }
}

fn blank_image(width: u32, height: u32) -> ImageFrame {
    ImageFrame::from_owned(width, height, 3, vec![255; (width * height * 3) as usize]).unwrap()
}

fn quad(coords: &[(i32, i32)]) -> Polygon {
    Polygon::from_coords(coords).unwrap()
}

#[test]
fn enabled_service_maps_crop_coordinates_to_image() {
    let (detector, seen) = StubDetector::new(vec![quad(&[(0, 0), (50, 0), (50, 30), (0, 30)])]);
    let service = DetectionService::enabled(Box::new(detector));
    let image = blank_image(200, 200);

    let fields = service
        .extract_text_regions(&image, &BorderBox::new(10, 20, 110, 120))
        .unwrap();

    assert_eq!(
        fields,
        vec![TextField {
            bbox: BorderBox::new(10, 20, 60, 50),
            text: String::new(),
        }]
    );
    assert_eq!(*seen.lock().unwrap(), vec![(100, 100)]);
}

#[test]
fn no_polygons_is_an_empty_success() {
    let (detector, _) = StubDetector::new(Vec::new());
    let service = DetectionService::enabled(Box::new(detector));
    let fields = service
        .extract_text_regions(&blank_image(64, 64), &BorderBox::new(0, 0, 64, 64))
        .unwrap();
    assert!(fields.is_empty());
}

#[test]
fn detector_order_is_preserved() {
    let (detector, _) = StubDetector::new(vec![
        quad(&[(40, 5), (60, 15)]),
        quad(&[(5, 5)]),
        quad(&[(10, 30), (30, 40)]),
    ]);
    let service = DetectionService::enabled(Box::new(detector));
    let fields = service
        .extract_text_regions(&blank_image(100, 100), &BorderBox::new(20, 10, 90, 90))
        .unwrap();
    let boxes: Vec<_> = fields.iter().map(|field| field.bbox).collect();
    assert_eq!(
        boxes,
        vec![
            BorderBox::new(60, 15, 80, 25),
            BorderBox::new(25, 15, 25, 15),
            BorderBox::new(30, 40, 50, 50),
        ]
    );
    assert!(fields.iter().all(|field| field.text.is_empty()));
}

#[test]
fn disabled_service_ignores_invalid_regions() {
    let service = DetectionService::disabled();
    let image = blank_image(10, 10);
    for region in [
        BorderBox::new(8, 0, 2, 5),
        BorderBox::new(-5, -5, 500, 500),
        BorderBox::new(0, 0, 10, 10),
    ] {
        assert!(service.extract_text_regions(&image, &region).unwrap().is_empty());
    }
    assert!(!service.is_enabled());
    assert_eq!(service.detector_name(), None);
}

#[test]
fn disabled_service_never_builds_a_detector() {
    let builds = AtomicUsize::new(0);
    let service = DetectionService::new(false, || {
        builds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingDetector) as Box<dyn TextDetector>)
    })
    .unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 0);
    assert!(service
        .extract_text_regions(&blank_image(4, 4), &BorderBox::new(0, 0, 4, 4))
        .unwrap()
        .is_empty());
}

#[test]
fn enabled_service_builds_its_detector_once() {
    let builds = AtomicUsize::new(0);
    let service = DetectionService::new(true, || {
        builds.fetch_add(1, Ordering::SeqCst);
        let (detector, _) = StubDetector::new(Vec::new());
        Ok(Box::new(detector) as Box<dyn TextDetector>)
    })
    .unwrap();
    let image = blank_image(8, 8);
    for _ in 0..3 {
        service
            .extract_text_regions(&image, &BorderBox::new(0, 0, 8, 8))
            .unwrap();
    }
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(service.detector_name(), Some("stub"));
}

#[test]
fn build_failure_is_returned() {
    let err = DetectionService::new(true, || Err(DetectorError::MissingModelPath)).unwrap_err();
    assert!(matches!(err, DetectorError::MissingModelPath));
}

#[test]
fn disabled_settings_skip_detector_construction() {
    // No model is configured, so building a detector would fail.
    let settings = DetectionSettings {
        enabled: false,
        ..DetectionSettings::default()
    };
    let service = DetectionService::from_config(&settings).unwrap();
    assert!(!service.is_enabled());
}

#[test]
fn out_of_bounds_region_fails_on_enabled_service() {
    let (detector, seen) = StubDetector::new(vec![quad(&[(0, 0)])]);
    let service = DetectionService::enabled(Box::new(detector));
    let err = service
        .extract_text_regions(&blank_image(50, 50), &BorderBox::new(10, 10, 60, 40))
        .unwrap_err();
    assert!(matches!(
        err,
        DetectionError::InvalidRegion(ImageError::RegionOutOfBounds { .. })
    ));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn inverted_region_fails_on_enabled_service() {
    let (detector, _) = StubDetector::new(Vec::new());
    let service = DetectionService::enabled(Box::new(detector));
    let err = service
        .extract_text_regions(&blank_image(50, 50), &BorderBox::new(30, 10, 20, 40))
        .unwrap_err();
    assert!(matches!(err, DetectionError::InvalidRegion(_)));
}

#[test]
fn detector_failure_is_propagated() {
    let service = DetectionService::enabled(Box::new(FailingDetector));
    let err = service
        .extract_text_regions(&blank_image(20, 20), &BorderBox::new(0, 0, 20, 20))
        .unwrap_err();
    assert!(matches!(
        err,
        DetectionError::Detector(DetectorError::Inference(_))
    ));
}

#[test]
fn polygons_outside_the_crop_are_not_clamped() {
    let (detector, _) = StubDetector::new(vec![quad(&[(-4, -2), (70, 15)])]);
    let service = DetectionService::enabled(Box::new(detector));
    let fields = service
        .extract_text_regions(&blank_image(100, 100), &BorderBox::new(10, 10, 60, 60))
        .unwrap();
    assert_eq!(fields[0].bbox, BorderBox::new(6, 8, 80, 25));
}

#[test]
fn batch_concatenates_regions_in_order() {
    let (detector, seen) = StubDetector::new(vec![quad(&[(1, 1), (3, 3)])]);
    let service = DetectionService::enabled(Box::new(detector));
    let regions = [BorderBox::new(0, 0, 10, 10), BorderBox::new(20, 30, 40, 50)];
    let fields = service
        .extract_text_regions_batch(&blank_image(60, 60), &regions)
        .unwrap();
    let boxes: Vec<_> = fields.iter().map(|field| field.bbox).collect();
    assert_eq!(
        boxes,
        vec![BorderBox::new(1, 1, 3, 3), BorderBox::new(21, 31, 23, 33)]
    );
    assert_eq!(*seen.lock().unwrap(), vec![(10, 10), (20, 20)]);
}

#[test]
fn batch_stops_at_first_invalid_region() {
    let (detector, seen) = StubDetector::new(Vec::new());
    let service = DetectionService::enabled(Box::new(detector));
    let regions = [
        BorderBox::new(0, 0, 10, 10),
        BorderBox::new(0, 0, 100, 10),
        BorderBox::new(5, 5, 10, 10),
    ];
    let result = service.extract_text_regions_batch(&blank_image(20, 20), &regions);
    assert!(matches!(result, Err(DetectionError::InvalidRegion(_))));
    assert_eq!(seen.lock().unwrap().len(), 1);
}
