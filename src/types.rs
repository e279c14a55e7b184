use std::time::Instant;

/// Sensor tracking id for one detected person.
pub type PersonId = u64;

/// 3-D position in the depth sensor's camera space, meters, +z away from the
/// sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// 2-D pixel position on the color image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePoint {
    pub x: f32,
    pub y: f32,
}

impl ImagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    pub fn label(&self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }
}

/// The skeletal joints the pipeline consumes. Everything else a sensor
/// reports is ignored at the seam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointKind {
    HandLeft,
    HandTipLeft,
    ShoulderLeft,
    HandRight,
    HandTipRight,
    ShoulderRight,
}

impl JointKind {
    pub const ALL: [JointKind; 6] = [
        JointKind::HandLeft,
        JointKind::HandTipLeft,
        JointKind::ShoulderLeft,
        JointKind::HandRight,
        JointKind::HandTipRight,
        JointKind::ShoulderRight,
    ];

    pub fn hand(side: HandSide) -> Self {
        match side {
            HandSide::Left => JointKind::HandLeft,
            HandSide::Right => JointKind::HandRight,
        }
    }

    pub fn hand_tip(side: HandSide) -> Self {
        match side {
            HandSide::Left => JointKind::HandTipLeft,
            HandSide::Right => JointKind::HandTipRight,
        }
    }

    pub fn shoulder(side: HandSide) -> Self {
        match side {
            HandSide::Left => JointKind::ShoulderLeft,
            HandSide::Right => JointKind::ShoulderRight,
        }
    }
}

/// One named joint as delivered by the sensor, before projection.
#[derive(Clone, Copy, Debug)]
pub struct SkeletonJoint {
    pub kind: JointKind,
    pub position: CameraPoint,
    pub tracked: bool,
}

/// One detected person in a body frame.
#[derive(Clone, Debug)]
pub struct Skeleton {
    pub person: PersonId,
    pub tracked: bool,
    pub joints: Vec<SkeletonJoint>,
}

impl Skeleton {
    pub fn joint(&self, kind: JointKind) -> Option<&SkeletonJoint> {
        self.joints.iter().find(|j| j.kind == kind)
    }
}

/// Skeletal frame from the body channel.
#[derive(Clone, Debug)]
pub struct BodyFrame {
    pub skeletons: Vec<Skeleton>,
    pub timestamp: Instant,
}

/// Pixel layouts the frame-buffer adapter accepts from a sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorFormat {
    /// 4 bytes/px, the converted output most depth-sensor SDKs offer.
    Bgra,
    /// 2 bytes/px packed, the raw stream format of the color camera.
    Yuyv,
    /// Already in canvas layout.
    Rgba,
}

/// Raw color frame from the color channel.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub data: Vec<u8>,
    pub format: ColorFormat,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

/// Mutable RGBA buffer the compositor draws onto.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Overlay-composited frame ready for the presentation surface.
#[derive(Clone, Debug)]
pub struct CompositedFrame {
    pub canvas: Canvas,
    pub timestamp: Instant,
}

/// Recognized-speech event from the speech engine.
#[derive(Clone, Debug)]
pub struct Utterance {
    pub text: String,
    /// Engine confidence in [0, 1].
    pub confidence: f32,
}
