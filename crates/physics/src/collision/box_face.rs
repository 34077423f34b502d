//! # Box-Face Resolution
//!
//! Decides which face of an axis-aligned box a sphere or an upright cylinder
//! ran into. Every "-vs-box" strategy funnels through [`resolve_box_face`].
//!
//! Each of the six faces is scored from the signed distance `s` of the
//! probe's centre in front of the face plane:
//!
//! - `s >= extent`: the face plane separates the shapes, so the whole box is
//!   missed.
//! - `s < 0`: the centre is behind the plane; some other face must decide.
//! - otherwise the centre is projected onto the face. A projection inside the
//!   face rectangle is a clean hit and wins immediately. A projection outside
//!   is clamped onto the rectangle: if the probe does not reach the clamped
//!   point the box is missed, otherwise the face is an edge candidate.
//!
//! Faces the terrain reports as covered are only used when nothing else hit.

use crate::body::RigidBody;
use crate::collision::ambiguity::{self, ContactSide, PriorOverlap};
use crate::collision::{BoxFace, ContactEnv, HitArea, HitResult};
use crate::error::PhysicsError;
use crate::shapes::Shape;
use crate::terrain::FaceCovering;
use crate::types::{Vec2, Vec3};

/// The body being tested against a box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Probe {
    Sphere {
        centre: Vec3,
        radius: f32,
    },
    Cylinder {
        centre: Vec3,
        radius: f32,
        half_height: f32,
    },
}

impl Probe {
    /// Probe for `body` anchored at `pos`; `None` for shapes that cannot
    /// probe a box.
    #[must_use]
    pub fn from_body(body: &RigidBody, pos: Vec3) -> Option<Self> {
        let centre = body.shape.centre(pos);
        match body.shape {
            Shape::Sphere(s) => Some(Self::Sphere {
                centre,
                radius: s.radius,
            }),
            Shape::Cylinder(c) => Some(Self::Cylinder {
                centre,
                radius: c.radius,
                half_height: c.half_height(),
            }),
            Shape::AaBox(_) => None,
        }
    }

    #[must_use]
    pub const fn centre(&self) -> Vec3 {
        match *self {
            Self::Sphere { centre, .. } | Self::Cylinder { centre, .. } => centre,
        }
    }

    #[must_use]
    pub const fn radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } | Self::Cylinder { radius, .. } => radius,
        }
    }

    #[must_use]
    pub const fn half_height(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } => radius,
            Self::Cylinder { half_height, .. } => half_height,
        }
    }

    /// Reach of the probe from its centre along the normal of `face`.
    fn extent(&self, face: BoxFace) -> f32 {
        if face.is_side() {
            self.radius()
        } else {
            self.half_height()
        }
    }

    /// The probe's own area touching `face`.
    #[must_use]
    pub const fn area_against(&self, face: BoxFace) -> HitArea {
        match self {
            Self::Sphere { .. } => HitArea::Unspecified,
            Self::Cylinder { .. } => HitArea::cylinder_against(face),
        }
    }
}

/// How a face was selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitQuality {
    /// The centre projects inside an exposed face.
    Clean,
    /// The probe overlaps an edge or corner of an exposed face.
    Edge,
    /// Only covered faces were hit; the best of them was used.
    Covered,
    /// The centre is inside the box; the shallowest face was used.
    Embedded,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceResolution {
    pub face: BoxFace,
    /// Contact point on the face.
    pub point: Vec3,
    pub quality: HitQuality,
    /// True when the contact point is the clamped edge/corner point rather
    /// than the centre's projection onto the face.
    pub clamped: bool,
    /// Push along the face normal that moves the probe entirely in front of
    /// the face plane.
    pub clearance: f32,
}

/// A probe and a box, at staged and at committed positions.
#[derive(Copy, Clone, Debug)]
pub struct BoxQuery {
    pub probe: Probe,
    pub prior_probe: Probe,
    pub box_centre: Vec3,
    pub prior_box_centre: Vec3,
    pub half_extents: Vec3,
    /// Velocity of the probe body relative to the box body.
    pub relative_speed: Vec3,
}

impl BoxQuery {
    /// Query for `mover` anchored at `p1` against the box body `target`
    /// anchored at `p2`. Committed positions serve as the prior state.
    #[must_use]
    pub fn new(mover: &RigidBody, p1: Vec3, target: &RigidBody, p2: Vec3) -> Option<Self> {
        let Shape::AaBox(aa_box) = target.shape else {
            return None;
        };
        Some(Self {
            probe: Probe::from_body(mover, p1)?,
            prior_probe: Probe::from_body(mover, mover.pos)?,
            box_centre: p2,
            prior_box_centre: target.pos,
            half_extents: aa_box.half_extents(),
            relative_speed: mover.next_speed - target.next_speed,
        })
    }

    fn prior_overlap(&self) -> PriorOverlap {
        let probe = self.prior_probe;
        let offset = probe.centre() - self.prior_box_centre;
        let vertical = offset.z.abs() < probe.half_height() + self.half_extents.z;
        let half = self.half_extents.truncate();
        let outside = (offset.truncate().abs() - half).max(Vec2::ZERO);
        let horizontal = outside.length() < probe.radius();
        PriorOverlap {
            vertical,
            horizontal,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Candidate {
    face: BoxFace,
    point: Vec3,
    clean: bool,
    s: f32,
    clearance: f32,
    covering: FaceCovering,
}

impl Candidate {
    fn resolution(&self, quality: HitQuality) -> FaceResolution {
        FaceResolution {
            face: self.face,
            point: self.point,
            quality,
            clamped: !self.clean,
            clearance: self.clearance,
        }
    }
}

enum FaceScore {
    Miss,
    Unknown { s: f32, clearance: f32 },
    Hit(Candidate),
}

fn score_face(query: &BoxQuery, face: BoxFace, env: &ContactEnv<'_>) -> FaceScore {
    let probe = query.probe;
    let c = probe.centre();
    let b = query.box_centre;
    let e = query.half_extents;
    let axis = face.axis();
    let sign = face.normal()[axis];
    let plane = b[axis] + sign * e[axis];
    let s = (c[axis] - plane) * sign;
    let extent = probe.extent(face);

    if s >= extent {
        return FaceScore::Miss;
    }
    let clearance = extent - s;
    if s < 0.0 {
        return FaceScore::Unknown { s, clearance };
    }

    let lo = b - e;
    let hi = b + e;
    let (point, clean) = match probe {
        Probe::Sphere { radius, .. } => {
            let mut point = c.clamp(lo, hi);
            point[axis] = plane;
            let clean = (0..3)
                .filter(|&i| i != axis)
                .all(|i| (c[i] - b[i]).abs() <= e[i]);
            if !clean && c.distance(point) >= radius {
                return FaceScore::Miss;
            }
            (point, clean)
        }
        Probe::Cylinder {
            radius,
            half_height,
            ..
        } => {
            let mut point = c.clamp(lo, hi);
            if face.is_side() {
                let z_lo = (c.z - half_height).max(lo.z);
                let z_hi = (c.z + half_height).min(hi.z);
                if z_lo >= z_hi {
                    return FaceScore::Miss;
                }
                point.z = 0.5 * (z_lo + z_hi);
            }
            point[axis] = plane;
            // A centre above or below the box leaves a side hit open to the
            // cap/side classification.
            let clean = (0..3)
                .filter(|&i| i != axis)
                .all(|i| (c[i] - b[i]).abs() <= e[i]);
            if !clean && c.truncate().distance(point.truncate()) >= radius {
                return FaceScore::Miss;
            }
            (point, clean)
        }
    };

    FaceScore::Hit(Candidate {
        face,
        point,
        clean,
        s,
        clearance,
        covering: env.coverage.of(face),
    })
}

/// Keeps whichever candidate has the clamped point farther from the probe
/// centre; the nearer clamped point belongs to the adjacent face that really
/// owns the corner. Ties go to the face the centre is farther in front of.
fn prefer_farther(current: Option<Candidate>, new: Candidate, centre: Vec3) -> Candidate {
    let Some(current) = current else {
        return new;
    };
    let d_current = centre.distance(current.point);
    let d_new = centre.distance(new.point);
    if (d_new - d_current).abs() <= f32::EPSILON * d_current.max(1.0) {
        if new.s > current.s {
            new
        } else {
            current
        }
    } else if d_new > d_current {
        new
    } else {
        current
    }
}

fn covered_rank(candidate: &Candidate) -> (u8, u8) {
    let covering = match candidate.covering {
        FaceCovering::NotCovered => 0,
        FaceCovering::PartiallyCovered => 1,
        FaceCovering::FullyCovered => 2,
    };
    (covering, u8::from(!candidate.clean))
}

/// Picks the face of the box hit by the probe, or `None` if they are apart.
#[must_use]
pub fn resolve_box_face(query: &BoxQuery, env: &ContactEnv<'_>) -> Option<FaceResolution> {
    let centre = query.probe.centre();
    let mut best_side: Option<Candidate> = None;
    let mut best_cap: Option<Candidate> = None;
    let mut covered: Option<Candidate> = None;
    let mut shallowest: Option<(BoxFace, f32, f32)> = None;

    for face in BoxFace::ALL {
        match score_face(query, face, env) {
            FaceScore::Miss => return None,
            FaceScore::Unknown { s, clearance } => {
                if shallowest.map_or(true, |(_, best, _)| s > best) {
                    shallowest = Some((face, s, clearance));
                }
            }
            FaceScore::Hit(candidate) if candidate.covering == FaceCovering::NotCovered => {
                if candidate.clean {
                    return Some(candidate.resolution(HitQuality::Clean));
                }
                if face.is_side() {
                    best_side = Some(prefer_farther(best_side, candidate, centre));
                } else {
                    best_cap = Some(prefer_farther(best_cap, candidate, centre));
                }
            }
            FaceScore::Hit(candidate) => {
                let better = covered.map_or(true, |current| {
                    let (new_rank, current_rank) = (covered_rank(&candidate), covered_rank(&current));
                    new_rank < current_rank || (new_rank == current_rank && candidate.s > current.s)
                });
                if better {
                    covered = Some(candidate);
                }
            }
        }
    }

    match (best_side, best_cap) {
        (Some(side), Some(cap)) => {
            let above = centre.z > query.box_centre.z;
            let chosen = match ambiguity::classify(
                query.prior_overlap(),
                query.relative_speed,
                above,
                env.config,
            ) {
                ContactSide::Side => side,
                ContactSide::Cap => cap,
            };
            return Some(chosen.resolution(HitQuality::Edge));
        }
        (Some(only), None) | (None, Some(only)) => {
            return Some(only.resolution(HitQuality::Edge));
        }
        (None, None) => {}
    }

    if let Some(candidate) = covered {
        if candidate.covering == FaceCovering::FullyCovered {
            tracing::warn!(
                face = ?candidate.face,
                centre = %centre,
                "contact through a fully covered face"
            );
        } else {
            tracing::debug!(face = ?candidate.face, "contact through a partially covered face");
        }
        return Some(candidate.resolution(HitQuality::Covered));
    }

    // Every face reported "unknown": the centre is inside the box.
    let exposed = BoxFace::ALL
        .into_iter()
        .filter(|&face| env.coverage.of(face) == FaceCovering::NotCovered)
        .filter_map(|face| match score_face(query, face, env) {
            FaceScore::Unknown { s, clearance } => Some((face, s, clearance)),
            _ => None,
        })
        .max_by(|a, b| a.1.total_cmp(&b.1));
    let (face, _, clearance) = exposed.or_else(|| {
        tracing::warn!(centre = %centre, "embedded in a box with every face covered");
        shallowest
    })?;
    let axis = face.axis();
    let mut point = centre;
    point[axis] = query.box_centre[axis] + face.normal()[axis] * query.half_extents[axis];
    Some(FaceResolution {
        face,
        point,
        quality: HitQuality::Embedded,
        clamped: false,
        clearance,
    })
}

/// Narrow-phase check of a sphere or cylinder body against a box body.
pub(crate) fn check_against_box(
    mover: &RigidBody,
    p1: Vec3,
    target: &RigidBody,
    p2: Vec3,
    env: &ContactEnv<'_>,
) -> Option<HitResult> {
    let query = BoxQuery::new(mover, p1, target, p2)?;
    let res = resolve_box_face(&query, env)?;
    Some(HitResult::new(
        res.point,
        -res.face.normal(),
        query.probe.area_against(res.face),
        HitArea::Box(res.face),
    ))
}

/// The face resolution at the staged positions, or `None` with a warning
/// when the bodies no longer touch.
pub(crate) fn staged_resolution(
    mover: &RigidBody,
    target: &RigidBody,
    env: &ContactEnv<'_>,
) -> Result<Option<(BoxQuery, FaceResolution)>, PhysicsError> {
    let Some(query) = BoxQuery::new(mover, mover.next_pos, target, target.next_pos) else {
        return Err(PhysicsError::Unimplemented(
            mover.shape.kind(),
            target.shape.kind(),
        ));
    };
    let Some(res) = resolve_box_face(&query, env) else {
        tracing::warn!(
            probe = %query.probe.centre(),
            box_centre = %query.box_centre,
            "body already clear of the box before separation"
        );
        return Ok(None);
    };
    Ok(Some((query, res)))
}
