use super::types::{Contact, Layer, LayerMask};

/// Decides whether a contact counts as hitting an obstacle.
pub trait ObstacleClassifier {
    fn is_obstacle(&self, contact: &Contact) -> bool;
}

/// Layer membership test: trigger volumes never count, solid colliders count when their
/// layer is in the obstacle mask (trees, rocks, buildings).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerClassifier {
    pub obstacle_layers: LayerMask,
}

impl LayerClassifier {
    pub fn new(layers: &[Layer]) -> Self {
        Self {
            obstacle_layers: LayerMask::from_tags(layers),
        }
    }
}

impl Default for LayerClassifier {
    fn default() -> Self {
        Self::new(&[Layer::Obstacle])
    }
}

impl ObstacleClassifier for LayerClassifier {
    fn is_obstacle(&self, contact: &Contact) -> bool {
        !contact.is_trigger && self.obstacle_layers.has(contact.layer)
    }
}

/// Discrete "hit an obstacle" event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleHit {
    pub other_id: u64,
}

/// Filters contacts through a classifier and queues the obstacle hits.
///
/// The queue is drained by whoever owns the scoring engine; nothing is delivered by
/// callback.
#[derive(Debug, Default)]
pub struct CollisionSensor<C: ObstacleClassifier = LayerClassifier> {
    classifier: C,
    pending: Vec<ObstacleHit>,
}

impl<C: ObstacleClassifier> CollisionSensor<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            pending: Vec::new(),
        }
    }

    /// Returns true if the contact was queued as an obstacle hit.
    pub fn on_contact(&mut self, contact: Contact) -> bool {
        if !self.classifier.is_obstacle(&contact) {
            return false;
        }
        log::trace!("obstacle contact with collider {}", contact.other_id);
        self.pending.push(ObstacleHit {
            other_id: contact.other_id,
        });
        true
    }

    pub fn pending(&self) -> &[ObstacleHit] {
        &self.pending
    }

    /// Take all queued hits, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<ObstacleHit> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(layer: Layer, is_trigger: bool) -> Contact {
        Contact {
            other_id: 7,
            layer,
            is_trigger,
        }
    }

    #[test]
    fn only_solid_contacts_on_obstacle_layers_are_queued() {
        let mut sensor = CollisionSensor::new(LayerClassifier::default());

        assert!(!sensor.on_contact(contact(Layer::Ground, false)));
        assert!(!sensor.on_contact(contact(Layer::Obstacle, true)));
        assert!(sensor.on_contact(contact(Layer::Obstacle, false)));

        assert_eq!(sensor.pending(), &[ObstacleHit { other_id: 7 }]);
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut sensor =
            CollisionSensor::new(LayerClassifier::new(&[Layer::Obstacle, Layer::Player]));
        sensor.on_contact(contact(Layer::Player, false));
        sensor.on_contact(contact(Layer::Obstacle, false));

        assert_eq!(sensor.drain().len(), 2);
        assert!(sensor.pending().is_empty());
    }

    #[test]
    fn custom_classifiers_plug_in() {
        struct Everything;
        impl ObstacleClassifier for Everything {
            fn is_obstacle(&self, _contact: &Contact) -> bool {
                true
            }
        }

        let mut sensor = CollisionSensor::new(Everything);
        assert!(sensor.on_contact(contact(Layer::Trigger, true)));
    }
}
